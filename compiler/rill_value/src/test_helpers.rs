//! Small host classes for exercising reflection and the bulk protocol.
//!
//! `Widget` has scalar and accelerated implementations for most of its
//! properties; `Gizmo` subclasses it; `Sprocket` is unrelated and exists to
//! build mixed collections.

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::{invalid_property_value, property_not_available};
use crate::{
    downcast, root_get_property, root_instance_method, root_set_property, CallContext,
    ClassDescriptor, DisplayOptions, EvalError, EvalResult, MethodSignature, ObjectRef,
    PropertySignature, ScriptObject, TypeMask, Value, OBJECT_CLASS,
};

/// Injected "ever set" flags plus a counter of scalar-path writes.
#[derive(Debug, Default)]
pub(crate) struct Flags {
    pub(crate) weight_set: AtomicBool,
    pub(crate) scalar_writes: AtomicUsize,
}

pub(crate) static WIDGET_CLASS: ClassDescriptor = ClassDescriptor::new(
    "Widget",
    Some(&OBJECT_CLASS),
    widget_properties,
    widget_methods,
);

pub(crate) static GIZMO_CLASS: ClassDescriptor =
    ClassDescriptor::new("Gizmo", Some(&WIDGET_CLASS), gizmo_properties, Vec::new);

pub(crate) static SPROCKET_CLASS: ClassDescriptor =
    ClassDescriptor::new("Sprocket", Some(&OBJECT_CLASS), Vec::new, Vec::new);

fn widget_properties() -> Vec<PropertySignature> {
    vec![
        PropertySignature::read_only("id", TypeMask::INT.singleton()).accelerated_get(get_ids),
        PropertySignature::read_write("label", TypeMask::STRING.singleton()),
        PropertySignature::read_write("tag", TypeMask::INT.singleton())
            .accelerated_get(get_tags)
            .accelerated_set(set_tags),
        PropertySignature::read_write("weight", TypeMask::FLOAT.singleton())
            .accelerated_get(get_weights)
            .accelerated_set(set_weights),
    ]
}

fn widget_methods() -> Vec<MethodSignature> {
    vec![
        MethodSignature::instance("doubled", TypeMask::FLOAT.singleton()).accelerated(doubled_bulk),
        MethodSignature::instance("scaled", TypeMask::FLOAT.singleton())
            .arg("factor", TypeMask::NUMERIC.singleton()),
        MethodSignature::class_method("total", TypeMask::FLOAT.singleton(), total_weight),
    ]
}

fn gizmo_properties() -> Vec<PropertySignature> {
    vec![PropertySignature::read_only("teeth", TypeMask::INT.singleton())]
}

#[derive(Debug, Default)]
struct WidgetState {
    weight: f64,
    tag: Option<i64>,
    label: String,
}

#[derive(Debug)]
pub(crate) struct Widget {
    id: i64,
    state: Mutex<WidgetState>,
    flags: Arc<Flags>,
}

impl Widget {
    pub(crate) fn new(id: i64, flags: &Arc<Flags>) -> Widget {
        Widget {
            id,
            state: Mutex::new(WidgetState::default()),
            flags: Arc::clone(flags),
        }
    }

    pub(crate) fn weight(&self) -> f64 {
        self.state.lock().weight
    }

    fn read(&self, class: &'static ClassDescriptor, property: &str) -> EvalResult {
        let state = self.state.lock();
        match property {
            "id" => Ok(Value::int(self.id)),
            "label" => Ok(Value::string(state.label.clone())),
            "tag" => state
                .tag
                .map(Value::int)
                .ok_or_else(|| property_not_available("tag", "Widget", "accessed before being set")),
            "weight" => Ok(Value::float(state.weight)),
            _ => root_get_property(class, property),
        }
    }

    fn write(&self, class: &'static ClassDescriptor, property: &str, value: &Value) -> Result<(), EvalError> {
        self.flags.scalar_writes.fetch_add(1, Ordering::Relaxed);
        match property {
            "label" => self.state.lock().label = value.string_at(0)?,
            "tag" => self.state.lock().tag = Some(value.int_at(0)?),
            "weight" => {
                self.state.lock().weight = valid_weight(value.float_at(0)?)?;
                self.flags.weight_set.store(true, Ordering::Relaxed);
            }
            _ => return root_set_property(class, property),
        }
        Ok(())
    }
}

impl ScriptObject for Widget {
    fn class(&self) -> &'static ClassDescriptor {
        &WIDGET_CLASS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn print_form(&self) -> String {
        format!("Widget<{}>", self.id)
    }

    fn get_property(&self, property: &str) -> EvalResult {
        self.read(self.class(), property)
    }

    fn set_property(&self, property: &str, value: &Value) -> Result<(), EvalError> {
        self.write(self.class(), property, value)
    }

    fn execute_instance_method(&self, method: &str, args: &[Value], ctx: &mut dyn CallContext) -> EvalResult {
        match method {
            "doubled" => Ok(Value::float(self.weight() * 2.0)),
            "scaled" => {
                let factor = args.first().map_or(Ok(1.0), |v| v.float_at(0))?;
                Ok(Value::float(self.weight() * factor))
            }
            _ => root_instance_method(self.class(), &|p| self.get_property(p), method, ctx),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Gizmo {
    widget: Widget,
    teeth: i64,
}

impl Gizmo {
    pub(crate) fn new(id: i64, teeth: i64, flags: &Arc<Flags>) -> Gizmo {
        Gizmo {
            widget: Widget::new(id, flags),
            teeth,
        }
    }
}

impl ScriptObject for Gizmo {
    fn class(&self) -> &'static ClassDescriptor {
        &GIZMO_CLASS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn get_property(&self, property: &str) -> EvalResult {
        match property {
            "teeth" => Ok(Value::int(self.teeth)),
            _ => self.widget.read(self.class(), property),
        }
    }

    fn set_property(&self, property: &str, value: &Value) -> Result<(), EvalError> {
        self.widget.write(self.class(), property, value)
    }

    fn execute_instance_method(&self, method: &str, args: &[Value], ctx: &mut dyn CallContext) -> EvalResult {
        self.widget.execute_instance_method(method, args, ctx)
    }
}

#[derive(Debug)]
pub(crate) struct Sprocket;

impl ScriptObject for Sprocket {
    fn class(&self) -> &'static ClassDescriptor {
        &SPROCKET_CLASS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `count` widgets with ids `0..count` sharing one flag set.
pub(crate) fn widgets(count: usize, flags: &Arc<Flags>) -> Vec<ObjectRef> {
    (0..count)
        .map(|id| Arc::new(Widget::new(i64::try_from(id).unwrap_or(i64::MAX), flags)) as ObjectRef)
        .collect()
}

/// A `CallContext` that captures output.
#[derive(Default)]
pub(crate) struct CaptureContext {
    pub(crate) output: String,
}

impl CallContext for CaptureContext {
    fn write_output(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn display_options(&self) -> DisplayOptions {
        DisplayOptions::default()
    }
}

fn valid_weight(weight: f64) -> Result<f64, EvalError> {
    if weight.is_nan() || weight < 0.0 {
        return Err(invalid_property_value(
            "weight",
            format!("must be >= 0.0 and not NAN (got {weight})"),
        ));
    }
    Ok(weight)
}

/// The widget state of a `Widget` or `Gizmo` element.
fn widget_of(element: &ObjectRef) -> Result<&Widget, EvalError> {
    match element.as_any().downcast_ref::<Gizmo>() {
        Some(gizmo) => Ok(&gizmo.widget),
        None => downcast::<Widget>(element),
    }
}

fn get_ids(elements: &[ObjectRef]) -> EvalResult {
    let mut ids = Vec::with_capacity(elements.len());
    for element in elements {
        ids.push(widget_of(element)?.id);
    }
    Ok(Value::int_vec(ids))
}

fn get_tags(elements: &[ObjectRef]) -> EvalResult {
    let mut tags = Vec::with_capacity(elements.len());
    for element in elements {
        let tag = widget_of(element)?.state.lock().tag;
        tags.push(tag.ok_or_else(|| property_not_available("tag", "Widget", "accessed before being set"))?);
    }
    Ok(Value::int_vec(tags))
}

fn get_weights(elements: &[ObjectRef]) -> EvalResult {
    let mut weights = Vec::with_capacity(elements.len());
    for element in elements {
        weights.push(widget_of(element)?.weight());
    }
    Ok(Value::float_vec(weights))
}

fn set_tags(elements: &[ObjectRef], value: &Value) -> Result<(), EvalError> {
    let broadcast = value.count() == 1;
    for (index, element) in elements.iter().enumerate() {
        let tag = value.int_at(if broadcast { 0 } else { index })?;
        widget_of(element)?.state.lock().tag = Some(tag);
    }
    Ok(())
}

fn set_weights(elements: &[ObjectRef], value: &Value) -> Result<(), EvalError> {
    let broadcast = value.count() == 1;
    for (index, element) in elements.iter().enumerate() {
        let weight = valid_weight(value.float_at(if broadcast { 0 } else { index })?)?;
        let widget = widget_of(element)?;
        widget.state.lock().weight = weight;
        widget.flags.weight_set.store(true, Ordering::Relaxed);
    }
    Ok(())
}

fn doubled_bulk(elements: &[ObjectRef], _args: &[Value], _ctx: &mut dyn CallContext) -> EvalResult {
    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        out.push(widget_of(element)?.weight() * 2.0);
    }
    Ok(Value::float_vec(out))
}

fn total_weight(
    _class: &'static ClassDescriptor,
    elements: &[ObjectRef],
    _args: &[Value],
    _ctx: &mut dyn CallContext,
) -> EvalResult {
    let mut total = 0.0;
    for element in elements {
        total += element.get_property("weight")?.float_at(0)?;
    }
    Ok(Value::float(total))
}
