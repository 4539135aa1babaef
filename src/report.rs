//! Output formatting for apidoc commands.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::doc::{DocParameter, DocRecord};
use crate::reflect::{ClassView, Introspector, Ownership, PropertyFilter, ReflectError};

// =============================================================================
// JSON Format
// =============================================================================

/// Ownership of a class's methods, with interface attribution.
#[derive(Debug, Serialize)]
pub struct JsonInheritance {
    pub version: String,
    pub class: String,
    /// Root ancestor first, the class itself last.
    pub ancestors: Vec<JsonAncestor>,
}

#[derive(Debug, Serialize)]
pub struct JsonAncestor {
    pub class: String,
    pub methods: Vec<JsonOwnedMethod>,
}

#[derive(Debug, Serialize)]
pub struct JsonOwnedMethod {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
}

/// A documented class.
#[derive(Debug, Serialize)]
pub struct JsonClass {
    pub version: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_string: String,
    pub doc: DocRecord,
    pub interfaces: Vec<String>,
    pub constants: BTreeMap<String, String>,
    pub properties: Vec<JsonProperty>,
    pub methods: Vec<JsonMethod>,
}

#[derive(Debug, Serialize)]
pub struct JsonProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub type_string: String,
    pub declared_in: String,
    pub doc: DocRecord,
}

#[derive(Debug, Serialize)]
pub struct JsonMethod {
    pub name: String,
    #[serde(rename = "type")]
    pub type_string: String,
    pub declared_in: String,
    pub inherited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    pub doc: DocRecord,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub code: String,
}

/// Interface attribution for every method of `view`.
pub fn method_interfaces<I: Introspector + ?Sized>(
    view: &ClassView<'_, I>,
) -> Result<BTreeMap<String, String>, ReflectError> {
    let mut interfaces = BTreeMap::new();
    for method in view.methods() {
        if let Some(interface) = view.method_interface(method.name())? {
            interfaces.insert(method.name().to_string(), interface);
        }
    }
    Ok(interfaces)
}

/// Build the inheritance report for `class`.
pub fn inheritance_report(
    class: &str,
    ownership: &Ownership,
    interfaces: &BTreeMap<String, String>,
) -> JsonInheritance {
    let ancestors = ownership
        .into_iter()
        .map(|bucket| JsonAncestor {
            class: bucket.class.clone(),
            methods: bucket
                .methods
                .keys()
                .map(|name| JsonOwnedMethod {
                    name: name.clone(),
                    interface: interfaces.get(name).cloned(),
                })
                .collect(),
        })
        .collect();

    JsonInheritance {
        version: env!("CARGO_PKG_VERSION").to_string(),
        class: class.to_string(),
        ancestors,
    }
}

/// Build the class report for `view`, method bodies included.
pub fn class_report<I: Introspector + ?Sized>(
    view: &ClassView<'_, I>,
    interfaces: &BTreeMap<String, String>,
) -> Result<JsonClass, ReflectError> {
    let properties = view
        .properties(PropertyFilter::ALL)
        .into_iter()
        .map(|p| JsonProperty {
            name: p.name().to_string(),
            type_string: p.type_string(),
            declared_in: p.info().declaring_class.clone(),
            doc: p.doc().clone(),
        })
        .collect();

    let mut methods = Vec::new();
    for m in view.methods() {
        methods.push(JsonMethod {
            name: m.name().to_string(),
            type_string: m.type_string(),
            declared_in: m.info().declaring_class.clone(),
            inherited: m.is_inherited(),
            interface: interfaces.get(m.name()).cloned(),
            doc: m.doc().clone(),
            code: m.code()?.to_string(),
        });
    }

    Ok(JsonClass {
        version: env!("CARGO_PKG_VERSION").to_string(),
        name: view.name().to_string(),
        type_string: view.type_string(),
        doc: view.doc().clone(),
        interfaces: view.info().interfaces.clone(),
        constants: view.constants().clone(),
        properties,
        methods,
    })
}

/// Write any report as pretty-printed JSON.
pub fn write_json<T: Serialize>(report: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write a parsed doc record.
pub fn write_record_pretty(record: &DocRecord) {
    println!();
    if record.is_empty() {
        println!("  {}", "(no documentation)".dimmed());
        println!();
        return;
    }
    write_record(record, "  ");
    println!();
}

/// Write the ownership buckets of a class.
pub fn write_inheritance_pretty(report: &JsonInheritance) {
    println!();
    print!("  {}", report.class.cyan().bold());
    println!(" {}", format!("({} classes in chain)", report.ancestors.len()).dimmed());
    println!();

    for ancestor in &report.ancestors {
        let marker = if ancestor.class == report.class { "*" } else { " " };
        println!(
            "  {} {} ({}):",
            marker,
            ancestor.class.bold(),
            ancestor.methods.len()
        );
        for method in &ancestor.methods {
            print!("      {}", method.name);
            if let Some(interface) = &method.interface {
                print!("  {}", format!("from {}", interface).dimmed());
            }
            println!();
        }
    }
    println!();
}

/// Write a documented class.
pub fn write_class_pretty(report: &JsonClass) {
    println!();
    print!("  {} ", report.type_string.dimmed());
    println!("{}", report.name.cyan().bold());
    if !report.interfaces.is_empty() {
        println!("  {} {}", "implements".dimmed(), report.interfaces.join(", "));
    }
    println!();

    if !report.doc.is_empty() {
        write_record(&report.doc, "  ");
        println!();
    }

    if !report.constants.is_empty() {
        println!("  {} ({}):", "Constants".bold(), report.constants.len());
        for (name, value) in &report.constants {
            println!("    {:<24} {}", name, value.dimmed());
        }
        println!();
    }

    if !report.properties.is_empty() {
        println!("  {} ({}):", "Properties".bold(), report.properties.len());
        for p in &report.properties {
            print!("    {:<18} {}", p.type_string.dimmed(), p.name);
            if let Some(description) = &p.doc.description {
                print!("  {}", description);
            }
            println!();
        }
        println!();
    }

    if !report.methods.is_empty() {
        println!("  {} ({}):", "Methods".bold(), report.methods.len());
        for m in &report.methods {
            print!("    {:<24} {}()", m.type_string.dimmed(), m.name.bold());
            if m.inherited {
                print!("  {}", format!("from {}", m.declared_in).dimmed());
            }
            if let Some(interface) = &m.interface {
                print!("  {}", format!("implements {}", interface).dimmed());
            }
            println!();
            if let Some(description) = &m.doc.description {
                println!("        {}", description);
            }
        }
        println!();
    }
}

fn write_record(record: &DocRecord, indent: &str) {
    if let Some(description) = &record.description {
        println!("{}{}", indent, description.bold());
    }
    if let Some(long) = &record.long_description {
        println!("{}{}", indent, long);
    }

    if record.is_deprecated {
        let message = record.deprecated_message.as_deref().unwrap_or("");
        println!("{}{} {}", indent, "DEPRECATED".yellow(), message);
    }

    let flags: Vec<&str> = [
        (record.is_abstract, "abstract"),
        (record.is_static, "static"),
        (record.is_ignored, "ignored"),
    ]
    .iter()
    .filter(|(set, _)| *set)
    .map(|(_, name)| *name)
    .collect();
    if !flags.is_empty() {
        println!("{}{:<12}{}", indent, "flags:".dimmed(), flags.join(", "));
    }

    if let Some(access) = &record.access {
        println!("{}{:<12}{}", indent, "access:".dimmed(), access);
    }

    let fields = [
        ("author:", &record.author),
        ("copyright:", &record.copyright),
        ("package:", &record.package),
        ("subpackage:", &record.sub_package),
        ("name:", &record.name),
        ("since:", &record.since),
        ("version:", &record.version),
        ("see:", &record.see),
        ("link:", &record.link),
        ("var:", &record.var_type),
        ("example:", &record.example),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{}{:<12}{}", indent, label.dimmed(), value);
        }
    }

    if !record.parameters().is_empty() {
        println!("{}{}", indent, "params:".dimmed());
        for parameter in record.parameters() {
            println!("{}  {}", indent, format_parameter(parameter));
        }
    }

    if let Some(returns) = &record.return_value {
        println!("{}{:<12}{}", indent, "return:".dimmed(), format_parameter(returns));
    }

    if !record.exceptions.is_empty() {
        println!("{}{}", indent, "throws:".dimmed());
        for exception in &record.exceptions {
            println!("{}  {}", indent, format_parameter(exception));
        }
    }

    for todo in &record.todos {
        println!("{}{} {}", indent, "TODO".yellow(), todo);
    }
}

fn format_parameter(parameter: &DocParameter) -> String {
    [
        parameter.type_name.as_deref(),
        parameter.name.as_deref(),
        parameter.description.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}
