//! Accelerated property and method bodies over homogeneous `Individual`
//! slices.
//!
//! Setters convert and validate the whole value before writing anything, so
//! a rejected assignment leaves every element untouched.

use std::sync::Arc;

use rill_value::errors::invalid_argument;
use rill_value::{
    downcast, CallContext, ClassDescriptor, EvalError, EvalResult, ObjectRef, Value,
};

use super::{valid_fitness_scaling, wf_age_error, Individual};
use crate::context::HostFlag;
use crate::genome::GENOME_CLASS;

fn collect<T>(
    elements: &[ObjectRef],
    read: impl Fn(&Individual) -> Result<T, EvalError>,
) -> Result<Vec<T>, EvalError> {
    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        out.push(read(downcast::<Individual>(element)?)?);
    }
    Ok(out)
}

/// Convert `value` to one entry per element, broadcasting a singleton.
fn spread<T: Copy>(
    elements: &[ObjectRef],
    value: &Value,
    at: impl Fn(&Value, usize) -> Result<T, EvalError>,
) -> Result<Vec<T>, EvalError> {
    if value.count() == 1 {
        Ok(vec![at(value, 0)?; elements.len()])
    } else {
        (0..elements.len()).map(|i| at(value, i)).collect()
    }
}

fn assign<T>(
    elements: &[ObjectRef],
    values: Vec<T>,
    write: impl Fn(&Individual, T),
) -> Result<(), EvalError> {
    for (element, value) in elements.iter().zip(values) {
        write(downcast::<Individual>(element)?, value);
    }
    Ok(())
}

/// The shared context of a slice, for marking flags once per assignment.
fn mark(elements: &[ObjectRef], flag: HostFlag) -> Result<(), EvalError> {
    if let Some(first) = elements.first() {
        downcast::<Individual>(first)?.context.mark(flag);
    }
    Ok(())
}

// Getters

pub(super) fn get_age(elements: &[ObjectRef]) -> EvalResult {
    Ok(Value::int_vec(collect(elements, Individual::age_or_unavailable)?))
}

pub(super) fn get_fitness_scaling(elements: &[ObjectRef]) -> EvalResult {
    Ok(Value::float_vec(collect(elements, |i| Ok(i.fitness_scaling()))?))
}

fn get_genome(elements: &[ObjectRef], which: usize) -> EvalResult {
    let genomes = collect(elements, |i| Ok(Arc::clone(&i.genomes[which]) as ObjectRef))?;
    Value::object_vec(&GENOME_CLASS, genomes)
}

pub(super) fn get_genome1(elements: &[ObjectRef]) -> EvalResult {
    get_genome(elements, 0)
}

pub(super) fn get_genome2(elements: &[ObjectRef]) -> EvalResult {
    get_genome(elements, 1)
}

pub(super) fn get_index(elements: &[ObjectRef]) -> EvalResult {
    Ok(Value::int_vec(collect(elements, |i| Ok(i.index_value()))?))
}

pub(super) fn get_migrant(elements: &[ObjectRef]) -> EvalResult {
    Ok(Value::logical_vec(collect(elements, |i| Ok(i.migrant))?))
}

pub(super) fn get_pedigree_id(elements: &[ObjectRef]) -> EvalResult {
    Ok(Value::int_vec(collect(elements, |i| {
        Ok(i.pedigree_or_unavailable("pedigreeID")?.id)
    })?))
}

pub(super) fn get_tag(elements: &[ObjectRef]) -> EvalResult {
    Ok(Value::int_vec(collect(elements, Individual::tag_or_unavailable)?))
}

pub(super) fn get_tag_f(elements: &[ObjectRef]) -> EvalResult {
    Ok(Value::float_vec(collect(elements, Individual::tag_f_or_unavailable)?))
}

fn get_axis(elements: &[ObjectRef], axis: usize) -> EvalResult {
    Ok(Value::float_vec(collect(elements, |i| Ok(i.state.lock().position[axis]))?))
}

pub(super) fn get_x(elements: &[ObjectRef]) -> EvalResult {
    get_axis(elements, 0)
}

pub(super) fn get_y(elements: &[ObjectRef]) -> EvalResult {
    get_axis(elements, 1)
}

pub(super) fn get_z(elements: &[ObjectRef]) -> EvalResult {
    get_axis(elements, 2)
}

// Setters

pub(super) fn set_age(elements: &[ObjectRef], value: &Value) -> Result<(), EvalError> {
    if let Some(first) = elements.first() {
        if downcast::<Individual>(first)?.context.is_wright_fisher() {
            return Err(wf_age_error());
        }
    }
    let ages = spread(elements, value, Value::int_at)?;
    assign(elements, ages, |i, age| i.state.lock().age = age)
}

pub(super) fn set_color(elements: &[ObjectRef], value: &Value) -> Result<(), EvalError> {
    let colors: Vec<String> = if value.count() == 1 {
        vec![value.string_at(0)?; elements.len()]
    } else {
        (0..elements.len()).map(|i| value.string_at(i)).collect::<Result<_, _>>()?
    };
    assign(elements, colors, |i, color| i.state.lock().color = color)?;
    mark(elements, HostFlag::Color)
}

pub(super) fn set_fitness_scaling(elements: &[ObjectRef], value: &Value) -> Result<(), EvalError> {
    let scalings = spread(elements, value, |v, i| valid_fitness_scaling(v.float_at(i)?))?;
    assign(elements, scalings, |i, s| i.state.lock().fitness_scaling = s)?;
    mark(elements, HostFlag::FitnessScaling)
}

pub(super) fn set_tag(elements: &[ObjectRef], value: &Value) -> Result<(), EvalError> {
    let tags = spread(elements, value, Value::int_at)?;
    assign(elements, tags, |i, tag| i.state.lock().tag = Some(tag))?;
    mark(elements, HostFlag::Tag)
}

pub(super) fn set_tag_f(elements: &[ObjectRef], value: &Value) -> Result<(), EvalError> {
    let tags = spread(elements, value, Value::float_at)?;
    assign(elements, tags, |i, tag| i.state.lock().tag_f = Some(tag))?;
    mark(elements, HostFlag::Tag)
}

fn set_axis(elements: &[ObjectRef], value: &Value, axis: usize) -> Result<(), EvalError> {
    let coords = spread(elements, value, Value::float_at)?;
    assign(elements, coords, |i, c| i.state.lock().position[axis] = c)
}

pub(super) fn set_x(elements: &[ObjectRef], value: &Value) -> Result<(), EvalError> {
    set_axis(elements, value, 0)
}

pub(super) fn set_y(elements: &[ObjectRef], value: &Value) -> Result<(), EvalError> {
    set_axis(elements, value, 1)
}

pub(super) fn set_z(elements: &[ObjectRef], value: &Value) -> Result<(), EvalError> {
    set_axis(elements, value, 2)
}

// Methods

pub(super) fn sum_of_mutations_of_type(
    elements: &[ObjectRef],
    args: &[Value],
    _ctx: &mut dyn CallContext,
) -> EvalResult {
    let mutation_type = args[0].int_at(0)?;
    Ok(Value::float_vec(collect(elements, |i| Ok(i.sum_of_type(mutation_type)))?))
}

/// `setSpatialPosition(position)`: one point for everyone, or one point per
/// receiver, each with as many coordinates as the model has dimensions.
pub(super) fn set_spatial_position(
    _class: &'static ClassDescriptor,
    elements: &[ObjectRef],
    args: &[Value],
    _ctx: &mut dyn CallContext,
) -> EvalResult {
    const CALLABLE: &str = "method setSpatialPosition()";

    let Some(first) = elements.first() else {
        return Ok(Value::invisible_null());
    };
    let dimensions = downcast::<Individual>(first)?.context.dimensionality();
    if dimensions == 0 {
        return Err(invalid_argument(CALLABLE, "cannot be called in non-spatial simulations"));
    }

    let position = &args[0];
    let broadcast = position.count() == dimensions;
    if !broadcast && position.count() != dimensions * elements.len() {
        return Err(invalid_argument(
            CALLABLE,
            format!(
                "requires the position parameter to contain either one point, or one point per \
                 individual (each with {dimensions} coordinate(s)), but size(position) == {}",
                position.count()
            ),
        ));
    }

    for (index, element) in elements.iter().enumerate() {
        let base = if broadcast { 0 } else { index * dimensions };
        let individual = downcast::<Individual>(element)?;
        let mut state = individual.state.lock();
        for (axis, coord) in state.position.iter_mut().take(dimensions).enumerate() {
            *coord = position.float_at(base + axis)?;
        }
    }
    Ok(Value::invisible_null())
}
