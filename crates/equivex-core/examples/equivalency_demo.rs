//! Equivalency Demo
//!
//! Walks through the main comparison features:
//! - Member-by-member comparison of typed objects
//! - Loose and strict collection ordering
//! - Member exclusion and missing-member policy
//! - Enum comparison by value and by name
//! - Cyclic reference detection
//! - JSON documents and option profiles

use equivex_core::model::{builtin, from_json, EnumValue, Object, Sequence, TypeDescriptor, Value};
use equivex_core::{are_equivalent, EquivalencyOptions, EquivalencyProfile, EquivalencyReport};

fn show(title: &str, report: &EquivalencyReport) {
    println!("{}", title);
    for line in report.to_string().lines() {
        println!("  {}", line);
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("EquivEx - Structural Equivalency Demo\n");

    // Typed objects
    let tone = TypeDescriptor::enumeration("Tone", &[("Warm", 1), ("Cool", 2)]);
    let palette = TypeDescriptor::enumeration("Palette", &[("Warm", 7), ("Cool", 8)]);
    let tags = TypeDescriptor::list(&builtin::string());
    let order = TypeDescriptor::class("Order")
        .property("Id", &builtin::i32())
        .property("Customer", &builtin::string())
        .property("Tone", &tone)
        .property("Tags", &tags)
        .property("Audit", &builtin::string())
        .build();

    let make = |customer: &str, tags_in_order: &[&str], audit: &str| -> Value {
        let items = tags_in_order.iter().map(|t| Value::from(*t)).collect();
        Object::new(&order)
            .with("Id", 7)
            .with("Customer", customer)
            .with("Tone", EnumValue::new(&tone, 1))
            .with("Tags", Sequence::new(&tags, items))
            .with("Audit", audit)
            .into()
    };

    let subject = make("Ada", &["rush", "gift"], "2024-01-01");
    let expectation = make("Ada", &["gift", "rush"], "2025-06-30");

    let options = EquivalencyOptions::default();
    show("Default options:", &are_equivalent(&subject, &expectation, &options)?);

    let options = EquivalencyOptions::default().excluding("Audit");
    show("Excluding Audit:", &are_equivalent(&subject, &expectation, &options)?);

    let options = EquivalencyOptions::default()
        .excluding("Audit")
        .with_strict_ordering_for("Tags");
    show("Strict ordering for Tags:", &are_equivalent(&subject, &expectation, &options)?);

    // Enums
    let warm = Value::from(EnumValue::new(&tone, 1));
    let warm_palette = Value::from(EnumValue::new(&palette, 7));
    show(
        "Enums by value:",
        &are_equivalent(&warm, &warm_palette, &EquivalencyOptions::default())?,
    );
    show(
        "Enums by name:",
        &are_equivalent(
            &warm,
            &warm_palette,
            &EquivalencyOptions::default().comparing_enums_by_name(),
        )?,
    );

    // Cycles
    let node = TypeDescriptor::class("Node")
        .property("Value", &builtin::i32())
        .self_property("Next")
        .build();
    let looped = |value: i32| -> Value {
        let object = Object::new(&node).with("Value", value);
        object.set("Next", object.clone());
        object.into()
    };
    show(
        "Cyclic references:",
        &are_equivalent(&looped(1), &looped(1), &EquivalencyOptions::default())?,
    );
    show(
        "Cyclic references ignored:",
        &are_equivalent(
            &looped(1),
            &looped(1),
            &EquivalencyOptions::default().ignoring_cyclic_references(),
        )?,
    );

    // JSON documents with a profile
    let actual = from_json(&serde_json::json!({"id": 1, "lines": [3, 2, 1], "trace": "abc"}));
    let wanted = from_json(&serde_json::json!({"id": 1, "lines": [1, 2, 3]}));
    let profile = EquivalencyProfile::from_yaml_str("missing_members: exclude\nstrict_ordering: true\n")?;
    let options = profile.apply(EquivalencyOptions::default());
    println!("Profile options:\n{}", options);
    show("JSON with profile:", &are_equivalent(&actual, &wanted, &options)?);

    Ok(())
}
