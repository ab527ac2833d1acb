//! Query command - run query DSL strings against one module
//!
//! Lists the types selected by the type queries and, for each of them, the
//! members selected by whichever member queries were given.
//!
//! Examples:
//!   bincompat query Lib.json --types "public Lib.*"
//!   bincompat query Lib.json --methods "public virtual * *(*)"
//!   bincompat query Lib.json --fields "const * *" --format json

use std::path::PathBuf;

use anyhow::Context;
use bincompat_core::printer::{event_signature, field_signature, method_signature, type_signature};
use bincompat_core::{JsonModuleLoader, ModuleLoader, QueryAggregator, TypeQueryMode};
use colored::Colorize;
use serde::Serialize;

use crate::config::BincompatConfig;
use crate::output::{Output, OutputFormat, TableDisplay};

/// Query strings given on the command line
#[derive(Debug, Default, Clone)]
pub struct QueryArgs {
    pub types: Option<String>,
    pub methods: Option<String>,
    pub fields: Option<String>,
    pub events: Option<String>,
}

/// One selected type and its selected members
#[derive(Debug, Serialize)]
pub struct TypeMatch {
    pub full_name: String,
    pub signature: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
}

/// Query result
#[derive(Debug, Serialize)]
pub struct QueryResult {
    pub module: String,
    pub types: Vec<TypeMatch>,
}

impl QueryResult {
    pub fn member_count(&self) -> usize {
        self.types
            .iter()
            .map(|t| t.methods.len() + t.fields.len() + t.events.len())
            .sum()
    }
}

impl TableDisplay for QueryResult {
    fn to_table(&self) -> String {
        let mut output = format!(
            "{} {} ({} types, {} members)\n",
            "MODULE:".cyan().bold(),
            self.module,
            self.types.len(),
            self.member_count()
        );
        if self.types.is_empty() {
            output.push_str(&format!("{}", "No matching types.".dimmed()));
            return output;
        }
        for ty in &self.types {
            output.push_str(&format!("\n{}\n", ty.signature.bold()));
            for (label, members) in [("event", &ty.events), ("field", &ty.fields), ("method", &ty.methods)] {
                for member in members {
                    output.push_str(&format!("\t{} {}\n", format!("[{}]", label).dimmed(), member));
                }
            }
        }
        output.trim_end().to_string()
    }
}

/// Build the aggregator: command-line queries replace the configured ones
/// per kind; member kinds without a query stay empty.
fn build_aggregator(args: &QueryArgs, config: &BincompatConfig) -> anyhow::Result<QueryAggregator> {
    let mut aggregator = QueryAggregator::new();
    match &args.types {
        Some(types) => aggregator.add_type_queries(types, TypeQueryMode::API_RELEVANT)?,
        None => aggregator.type_queries = config.aggregator()?.type_queries,
    }
    if let Some(q) = &args.methods {
        aggregator.add_method_query(q)?;
    }
    if let Some(q) = &args.fields {
        aggregator.add_field_query(q)?;
    }
    if let Some(q) = &args.events {
        aggregator.add_event_query(q)?;
    }
    Ok(aggregator)
}

pub fn execute(graph: &bincompat_core::ModuleGraph, aggregator: &QueryAggregator) -> QueryResult {
    let types = aggregator
        .select_types(graph)
        .into_iter()
        .map(|ty| TypeMatch {
            full_name: ty.full_name(),
            signature: type_signature(ty),
            methods: aggregator
                .select_methods(ty)
                .into_iter()
                .map(|m| method_signature(m, true))
                .collect(),
            fields: aggregator.select_fields(ty).into_iter().map(field_signature).collect(),
            events: aggregator.select_events(ty).into_iter().map(event_signature).collect(),
        })
        .collect();
    QueryResult {
        module: graph.name.clone(),
        types,
    }
}

/// Run the query command
pub async fn run(module: &str, args: QueryArgs, config: &BincompatConfig, format: OutputFormat) -> anyhow::Result<()> {
    let aggregator = build_aggregator(&args, config)?;
    let path = PathBuf::from(module);

    let graph = tokio::task::spawn_blocking(move || {
        JsonModuleLoader::new()
            .load(&path)
            .with_context(|| format!("Failed to load module {}", path.display()))
    })
    .await
    .context("Load task panicked")??;

    let result = execute(&graph, &aggregator);
    tracing::debug!(types = result.types.len(), "Query complete");
    Output::new(result, format).render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bincompat_core::model::{Access, FieldNode, MethodNode, ModuleGraph, TypeKind, TypeNode, TypeReference, Visibility};

    fn make_graph() -> ModuleGraph {
        let a = TypeNode::new("Lib", "A", TypeKind::Class, Visibility::Public)
            .with_method(MethodNode::new("Run", TypeReference::void(), Access::Public).with_virtual(true))
            .with_method(MethodNode::new("Stop", TypeReference::void(), Access::Public))
            .with_field(FieldNode::new("Count", TypeReference::parse("System.Int32"), Access::Public));
        let hidden = TypeNode::new("Lib", "Hidden", TypeKind::Class, Visibility::Internal);
        ModuleGraph::new("Lib").with_type(a).with_type(hidden).normalize()
    }

    #[test]
    fn test_execute_member_queries() {
        let args = QueryArgs {
            types: Some("public Lib.*".to_string()),
            methods: Some("public virtual * *(*)".to_string()),
            ..Default::default()
        };
        let aggregator = build_aggregator(&args, &BincompatConfig::default()).unwrap();
        let result = execute(&make_graph(), &aggregator);

        assert_eq!(result.types.len(), 1);
        assert_eq!(result.types[0].full_name, "Lib.A");
        assert_eq!(result.types[0].methods, vec!["public virtual void Run()"]);
        assert!(result.types[0].fields.is_empty());
        assert_eq!(result.member_count(), 1);
    }

    #[test]
    fn test_types_default_to_config() {
        let aggregator = build_aggregator(&QueryArgs::default(), &BincompatConfig::default()).unwrap();
        let result = execute(&make_graph(), &aggregator);
        assert_eq!(result.types.len(), 1);
        assert_eq!(result.member_count(), 0);
    }

    #[test]
    fn test_bad_query_is_rejected() {
        let args = QueryArgs {
            fields: Some("public".to_string()),
            ..Default::default()
        };
        assert!(build_aggregator(&args, &BincompatConfig::default()).is_err());
    }
}
