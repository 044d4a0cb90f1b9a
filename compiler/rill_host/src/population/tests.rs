#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::subpopulation::SUBPOPULATION_CLASS;
use crate::test_helpers::CaptureContext;
use pretty_assertions::assert_eq;
use rill_value::accelerated::{get_property_of_elements, set_property_of_elements};
use rill_value::{EvalErrorKind, ObjectRef, ScriptObject, Value};

#[test]
fn builder_creates_numbered_subpopulations() {
    let pop = Population::builder()
        .subpopulation(1, 3)
        .sexual_subpopulation(2, 2, 1)
        .build();
    assert_eq!(pop.subpopulations().len(), 2);

    let p2 = pop.subpopulation(2).unwrap();
    assert_eq!(p2.len(), 3);
    assert_eq!(p2.get_property("individualCount").unwrap(), Value::int(3));
    let sexes: Vec<_> = (0..3)
        .map(|i| p2.individual(i).unwrap().sex().code())
        .collect();
    assert_eq!(sexes, ["F", "F", "M"]);
    assert_eq!(p2.print_form(), "Subpopulation<p2>");

    let err = pop.subpopulation(9).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::UndefinedIdentifier { name: "p9".into() });
}

#[test]
fn sex_chromosomes_give_males_a_null_y() {
    let pop = Population::builder()
        .sex_chromosomes(true)
        .sexual_subpopulation(1, 1, 1)
        .build();
    let p1 = pop.subpopulation(1).unwrap();
    let female = p1.individual(0).unwrap();
    let male = p1.individual(1).unwrap();

    assert_eq!(female.genome(1).unwrap().genome_type(), GenomeType::XChromosome);
    assert!(!female.genome(1).unwrap().is_null());
    assert_eq!(male.genome(1).unwrap().genome_type(), GenomeType::YChromosome);
    assert!(male.genome(1).unwrap().is_null());
    assert!(male.genome(2).is_none());
}

#[test]
fn offspring_carry_pedigrees_and_migrant_status() {
    let pop = Population::builder()
        .pedigrees(true)
        .subpopulation(1, 2)
        .subpopulation(2, 0)
        .build();
    let p1 = pop.subpopulation(1).unwrap();
    let (a, b) = (p1.individual(0).unwrap(), p1.individual(1).unwrap());

    let local = pop.add_offspring(1, &a, &b, Sex::Hermaphrodite).unwrap();
    assert_eq!(local.index(), 2);
    assert_eq!(local.pedigree().unwrap().id, 3);
    assert_eq!(local.get_property("migrant").unwrap(), Value::logical(false));

    let moved = pop.add_offspring(2, &local, &a, Sex::Hermaphrodite).unwrap();
    assert_eq!(moved.index(), 0);
    assert_eq!(moved.subpopulation_id(), 2);
    assert_eq!(moved.get_property("migrant").unwrap(), Value::logical(true));
    assert_eq!(moved.pedigree().unwrap().grandparents, [1, 2, -1, -1]);
    assert!(pop.subpopulation(2).unwrap().individual(0).is_some());

    assert!(pop.add_offspring(5, &a, &b, Sex::Female).is_err());
}

#[test]
fn pedigrees_are_absent_when_untracked() {
    let pop = Population::builder().subpopulation(1, 2).build();
    let p1 = pop.subpopulation(1).unwrap();
    let (a, b) = (p1.individual(0).unwrap(), p1.individual(1).unwrap());
    let child = pop.add_offspring(1, &a, &b, Sex::Hermaphrodite).unwrap();
    assert!(a.pedigree().is_none());
    assert!(child.pedigree().is_none());
}

#[test]
fn subpopulation_properties() {
    let pop = Population::builder().subpopulation(4, 2).build();
    let p4 = pop.subpopulation(4).unwrap();
    let elements = vec![Arc::clone(p4) as ObjectRef];
    let mut ctx = CaptureContext::default();

    let individuals = get_property_of_elements(&SUBPOPULATION_CLASS, &elements, "individuals").unwrap();
    assert_eq!(individuals.count(), 2);
    assert_eq!(individuals.element_type_name(), "Individual");

    assert!(get_property_of_elements(&SUBPOPULATION_CLASS, &elements, "tag").is_err());
    set_property_of_elements(&SUBPOPULATION_CLASS, &elements, "tag", &Value::int(12)).unwrap();
    assert_eq!(p4.get_property("tag").unwrap(), Value::int(12));
    assert_eq!(p4.get_property("id").unwrap(), Value::int(4));
    assert!(!p4.is_empty());
    assert!(Arc::ptr_eq(p4.context(), pop.context()));

    p4.execute_instance_method("str", &[], &mut ctx).unwrap();
    assert!(ctx.output.contains("\tindividualCount => (integer) 2\n"));
}
