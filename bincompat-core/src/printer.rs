//! Text report of an assembly diff, plus C#-like member signatures.
//!
//! Removed and added types come first, then every changed type with its
//! base type change and `+`/`-` lines for interfaces, events, fields and
//! methods.

use serde::Serialize;

use crate::differ::{AssemblyDiffCollection, DiffCollection, DiffOperation, TypeDiff};
use crate::model::{EventNode, FieldNode, MethodNode, TypeKind, TypeNode, TypeReference, Visibility};
use crate::typename::{full_to_short, strip_arity};

/// One line of the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    /// Indentation level, starting at 1.
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<DiffOperation>,
    pub text: String,
}

impl ReportLine {
    fn plain(depth: usize, text: String) -> Self {
        Self {
            depth,
            operation: None,
            text,
        }
    }

    fn change(depth: usize, operation: DiffOperation, text: String) -> Self {
        Self {
            depth,
            operation: Some(operation),
            text,
        }
    }

    /// Tab-indented line with its `+`/`-` marker.
    pub fn render(&self) -> String {
        let indent = "\t".repeat(self.depth);
        match self.operation {
            Some(op) => format!("{}{} {}", indent, op.sign(), self.text),
            None => format!("{}{}", indent, self.text),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DiffPrinter {
    parameter_names: bool,
}

impl Default for DiffPrinter {
    fn default() -> Self {
        Self {
            parameter_names: true,
        }
    }
}

impl DiffPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print method parameter names, not just their types.
    pub fn with_parameter_names(mut self, enabled: bool) -> Self {
        self.parameter_names = enabled;
        self
    }

    pub fn lines(&self, diff: &AssemblyDiffCollection) -> Vec<ReportLine> {
        let mut lines = Vec::new();
        self.added_removed_types(&diff.added_removed_types, &mut lines);
        for changed in &diff.changed_types {
            self.type_changes(changed, &mut lines);
        }
        lines
    }

    pub fn render(&self, diff: &AssemblyDiffCollection) -> String {
        self.lines(diff)
            .iter()
            .map(ReportLine::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn added_removed_types(&self, types: &DiffCollection<TypeNode>, lines: &mut Vec<ReportLine>) {
        let removed = types.removed_count();
        if removed > 0 {
            lines.push(ReportLine::plain(1, format!("Removed {} public type/s", removed)));
            for ty in types.removed() {
                lines.push(ReportLine::change(2, DiffOperation::Removed, type_signature(ty)));
            }
        }

        let added = types.added_count();
        if added > 0 {
            lines.push(ReportLine::plain(1, format!("Added {} public type/s", added)));
            for ty in types.added() {
                lines.push(ReportLine::change(2, DiffOperation::Added, type_signature(ty)));
            }
        }
    }

    fn type_changes(&self, diff: &TypeDiff, lines: &mut Vec<ReportLine>) {
        lines.push(ReportLine::plain(1, type_signature(&diff.old_type)));

        if diff.has_changed_base_type() {
            lines.push(ReportLine::plain(
                2,
                format!(
                    "Base type changed: {} -> {}",
                    diff.old_base_name().unwrap_or_default(),
                    diff.new_base_name().unwrap_or_default()
                ),
            ));
        }

        push_changes(lines, &diff.interfaces, |itf| format!("interface: {}", itf.full_name()));
        push_changes(lines, &diff.events, event_signature);
        push_changes(lines, &diff.fields, field_signature);
        push_changes(lines, &diff.methods, |m| method_signature(m, self.parameter_names));
    }
}

/// Added items first, then removed, each as a `+`/`-` line.
fn push_changes<T>(lines: &mut Vec<ReportLine>, changes: &DiffCollection<T>, print: impl Fn(&T) -> String) {
    for item in changes.added() {
        lines.push(ReportLine::change(2, DiffOperation::Added, print(item)));
    }
    for item in changes.removed() {
        lines.push(ReportLine::change(2, DiffOperation::Removed, print(item)));
    }
}

/// Short display name: aliases for well-known types, generic arguments in angle brackets.
pub fn type_ref_name(reference: &TypeReference) -> String {
    if reference.generic_arguments.is_empty() {
        return full_to_short(&reference.full_name());
    }
    let arguments: Vec<String> = reference
        .generic_arguments
        .iter()
        .map(|arg| {
            if arg.generic_arguments.is_empty() {
                full_to_short(&format!("{}{}", arg.name, arg.suffix))
            } else {
                type_ref_name(arg)
            }
        })
        .collect();
    format!(
        "{}<{}>{}",
        strip_arity(&reference.name),
        arguments.join(","),
        reference.suffix
    )
}

/// e.g. `public class Lib.Cache<K,V>` or `internal struct Lib.Outer/Inner`.
pub fn type_signature(ty: &TypeNode) -> String {
    let mut out = String::new();
    out.push_str(match ty.visibility {
        Visibility::Public => "public ",
        Visibility::Internal => "internal ",
    });
    out.push_str(match ty.kind {
        TypeKind::Interface => "interface ",
        TypeKind::Enum => "enum ",
        TypeKind::Struct => "struct ",
        TypeKind::Class => "class ",
    });
    match &ty.declaring_type {
        Some(declaring) => {
            out.push_str(&declaring.element_name());
            out.push('/');
        }
        None if !ty.namespace.is_empty() => {
            out.push_str(&ty.namespace);
            out.push('.');
        }
        None => {}
    }
    out.push_str(strip_arity(&ty.name));
    if !ty.generic_parameters.is_empty() {
        out.push('<');
        out.push_str(&ty.generic_parameters.join(","));
        out.push('>');
    }
    out
}

/// e.g. `public virtual string Format(int value,out bool ok)`.
pub fn method_signature(method: &MethodNode, parameter_names: bool) -> String {
    let mut out = String::new();
    out.push_str(method.access.keyword());
    out.push(' ');
    if method.is_virtual && method.has_body {
        out.push_str("virtual ");
    }
    if method.is_static {
        out.push_str("static ");
    }
    out.push_str(&type_ref_name(&method.return_type));
    out.push(' ');
    out.push_str(&method.name);

    let parameters: Vec<String> = method
        .parameters
        .iter()
        .map(|p| {
            let mut param = String::new();
            if p.is_out {
                param.push_str("out ");
            }
            let type_name = type_ref_name(&p.parameter_type);
            if p.is_out {
                param.push_str(type_name.trim_end_matches('&'));
            } else {
                param.push_str(&type_name);
            }
            if parameter_names {
                param.push(' ');
                param.push_str(&p.name);
            }
            param
        })
        .collect();
    out.push('(');
    out.push_str(&parameters.join(","));
    out.push(')');
    out
}

/// e.g. `public const int Max - Value: 10`.
pub fn field_signature(field: &FieldNode) -> String {
    let mut out = String::new();
    out.push_str(field.access.keyword());
    out.push(' ');
    if field.is_static && !field.has_constant() {
        out.push_str("static ");
    }
    if field.is_init_only {
        out.push_str("readonly ");
    }
    if field.has_constant() {
        out.push_str("const ");
    }
    out.push_str(&type_ref_name(&field.field_type));
    out.push(' ');
    out.push_str(&field.name);
    if let Some(value) = &field.constant {
        out.push_str(&format!(" - Value: {}", value));
    }
    out
}

/// e.g. `public event EventHandler<Args> Closing`; modifiers come from the add accessor.
pub fn event_signature(event: &EventNode) -> String {
    let add = &event.add_method;
    let mut out = String::new();
    out.push_str(add.access.keyword());
    out.push(' ');
    if add.is_virtual {
        out.push_str("virtual ");
    }
    if add.is_static {
        out.push_str("static ");
    }
    out.push_str("event ");
    out.push_str(&type_ref_name(&event.event_type));
    out.push(' ');
    out.push_str(&event.name);
    out
}
