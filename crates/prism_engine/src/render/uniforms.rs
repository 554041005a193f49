//! Named shader parameter bindings
//!
//! A [`UniformMap`] connects application state to shader parameters. Each
//! named slot holds an immediate value, a shared reference to externally
//! owned state, or a zero-argument closure, and is evaluated fresh once per
//! resolution pass. There is no caching: a closure slot always reflects the
//! state at the moment it is resolved, which is what live values like
//! elapsed time or a per-draw matrix need.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::foundation::math::{Mat3, Mat4, Vec3, Vec4};
use crate::render::api::UniformValue;

/// Shared cell for a reference-kind uniform slot.
///
/// The owner keeps one handle and writes through it; the map keeps the other
/// and reads the latest value at resolution time.
pub type UniformCell<T> = Rc<RefCell<T>>;

/// Create a shared cell usable as a reference slot
pub fn uniform_cell<T>(value: T) -> UniformCell<T> {
    Rc::new(RefCell::new(value))
}

/// One stored slot: how the value is produced at resolution time
enum Slot<T> {
    /// Immediate value stored in the map
    Value(T),
    /// Live reference to externally-owned state
    Reference(UniformCell<T>),
    /// Computed fresh on every resolution pass
    Function(Box<dyn Fn() -> T>),
}

impl<T: Copy> Slot<T> {
    fn get(&self) -> T {
        match self {
            Slot::Value(value) => *value,
            Slot::Reference(cell) => *cell.borrow(),
            Slot::Function(function) => function(),
        }
    }
}

/// Name-keyed slots of one value kind
struct TypeMap<T> {
    map: HashMap<String, Slot<T>>,
}

impl<T: Copy> TypeMap<T> {
    fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    // Last write wins on a duplicate name.
    fn set(&mut self, name: &str, slot: Slot<T>) {
        self.map.insert(name.to_owned(), slot);
    }

    fn resolve<F: FnMut(&str, T)>(&self, mut sink: F) {
        for (name, slot) in &self.map {
            sink(name, slot.get());
        }
    }

    fn clear(&mut self) {
        self.map.clear();
    }
}

macro_rules! slot_setters {
    ($set:ident, $set_ref:ident, $set_fn:ident, $ty:ty, $map:ident) => {
        /// Store an immediate value under a name
        pub fn $set(&mut self, name: &str, value: $ty) {
            self.$map.set(name, Slot::Value(value));
        }

        /// Store a live reference; the cell is read at resolution time
        pub fn $set_ref(&mut self, name: &str, cell: UniformCell<$ty>) {
            self.$map.set(name, Slot::Reference(cell));
        }

        /// Store a computed slot, invoked fresh on every resolution pass
        pub fn $set_fn(&mut self, name: &str, function: impl Fn() -> $ty + 'static) {
            self.$map.set(name, Slot::Function(Box::new(function)));
        }
    };
}

/// Polymorphic store of named shader-facing values.
///
/// One map per value kind; a name is unique within its kind and the last
/// write wins. [`resolve_all`](Self::resolve_all) walks every kind and
/// forwards each current value to the sink.
#[derive(Default)]
pub struct UniformMap {
    float_map: TypeMap<f32>,
    int_map: TypeMap<i32>,
    bool_map: TypeMap<bool>,
    vec3_map: TypeMap<Vec3>,
    vec4_map: TypeMap<Vec4>,
    mat3_map: TypeMap<Mat3>,
    mat4_map: TypeMap<Mat4>,
}

impl<T: Copy> Default for TypeMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformMap {
    /// Create an empty uniform map
    pub fn new() -> Self {
        Self::default()
    }

    slot_setters!(set_float, set_float_ref, set_float_fn, f32, float_map);
    slot_setters!(set_int, set_int_ref, set_int_fn, i32, int_map);
    slot_setters!(set_bool, set_bool_ref, set_bool_fn, bool, bool_map);
    slot_setters!(set_vec3, set_vec3_ref, set_vec3_fn, Vec3, vec3_map);
    slot_setters!(set_vec4, set_vec4_ref, set_vec4_fn, Vec4, vec4_map);
    slot_setters!(set_mat3, set_mat3_ref, set_mat3_fn, Mat3, mat3_map);
    slot_setters!(set_mat4, set_mat4_ref, set_mat4_fn, Mat4, mat4_map);

    /// Evaluate every slot of every kind and forward `(name, value)` pairs
    /// to the sink.
    ///
    /// Closure slots run exactly once per call; nothing is memoized between
    /// passes.
    pub fn resolve_all<F: FnMut(&str, UniformValue)>(&self, mut sink: F) {
        self.float_map
            .resolve(|name, value| sink(name, UniformValue::Float(value)));
        self.int_map
            .resolve(|name, value| sink(name, UniformValue::Int(value)));
        self.bool_map
            .resolve(|name, value| sink(name, UniformValue::Bool(value)));
        self.vec3_map
            .resolve(|name, value| sink(name, UniformValue::Vec3(value)));
        self.vec4_map
            .resolve(|name, value| sink(name, UniformValue::Vec4(value)));
        self.mat3_map
            .resolve(|name, value| sink(name, UniformValue::Mat3(value)));
        self.mat4_map
            .resolve(|name, value| sink(name, UniformValue::Mat4(value)));
    }

    /// Empty every kind's mapping.
    ///
    /// Used when a node re-initializes and rebuilds its default bindings.
    pub fn clear(&mut self) {
        self.float_map.clear();
        self.int_map.clear();
        self.bool_map.clear();
        self.vec3_map.clear();
        self.vec4_map.clear();
        self.mat3_map.clear();
        self.mat4_map.clear();
    }
}

impl std::fmt::Debug for UniformMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniformMap")
            .field("floats", &self.float_map.map.len())
            .field("ints", &self.int_map.map.len())
            .field("bools", &self.bool_map.map.len())
            .field("vec3s", &self.vec3_map.map.len())
            .field("vec4s", &self.vec4_map.map.len())
            .field("mat3s", &self.mat3_map.map.len())
            .field("mat4s", &self.mat4_map.map.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn resolve_one(uniforms: &UniformMap, wanted: &str) -> Option<UniformValue> {
        let mut found = None;
        uniforms.resolve_all(|name, value| {
            if name == wanted {
                found = Some(value);
            }
        });
        found
    }

    #[test]
    fn value_slot_returns_last_set() {
        let mut uniforms = UniformMap::new();
        uniforms.set_float("u_opacity", 0.5);
        uniforms.set_float("u_opacity", 0.75);

        match resolve_one(&uniforms, "u_opacity") {
            Some(UniformValue::Float(value)) => assert_relative_eq!(value, 0.75),
            other => panic!("unexpected slot {other:?}"),
        }
    }

    #[test]
    fn function_slot_reflects_state_changes() {
        let state = uniform_cell(1.0f32);

        let mut uniforms = UniformMap::new();
        let read_state = Rc::clone(&state);
        uniforms.set_float_fn("u_elapsed_time", move || *read_state.borrow());

        match resolve_one(&uniforms, "u_elapsed_time") {
            Some(UniformValue::Float(value)) => assert_relative_eq!(value, 1.0),
            other => panic!("unexpected slot {other:?}"),
        }

        *state.borrow_mut() = 42.0;
        match resolve_one(&uniforms, "u_elapsed_time") {
            Some(UniformValue::Float(value)) => assert_relative_eq!(value, 42.0),
            other => panic!("unexpected slot {other:?}"),
        }
    }

    #[test]
    fn reference_slot_reads_latest_cell_value() {
        let cell = uniform_cell(Vec3::zeros());

        let mut uniforms = UniformMap::new();
        uniforms.set_vec3_ref("u_offset", Rc::clone(&cell));

        *cell.borrow_mut() = Vec3::new(1.0, 2.0, 3.0);
        match resolve_one(&uniforms, "u_offset") {
            Some(UniformValue::Vec3(value)) => {
                assert_relative_eq!(value, Vec3::new(1.0, 2.0, 3.0));
            }
            other => panic!("unexpected slot {other:?}"),
        }
    }

    #[test]
    fn same_name_in_different_kinds_coexists() {
        let mut uniforms = UniformMap::new();
        uniforms.set_float("u_value", 2.0);
        uniforms.set_int("u_value", 7);

        let mut resolved = 0;
        uniforms.resolve_all(|name, _| {
            if name == "u_value" {
                resolved += 1;
            }
        });
        assert_eq!(resolved, 2);
    }

    #[test]
    fn clear_empties_all_kinds() {
        let mut uniforms = UniformMap::new();
        uniforms.set_float("a", 1.0);
        uniforms.set_mat4("b", Mat4::identity());
        uniforms.clear();

        let mut resolved = 0;
        uniforms.resolve_all(|_, _| resolved += 1);
        assert_eq!(resolved, 0);
    }
}
