//! Component substitution: the one pass that rewrites structure rather
//! than class lists. Promotion is all-or-nothing per element: a single
//! attribute outside the allow-list vetoes that element and leaves it
//! exactly as written.

use crate::pipeline::ContextFiles;
use crate::report::{PassReport, Violation};
use crate::tokens::TokenTable;
use graft_parser::{Attribute, Element, Tree};
use std::collections::{BTreeMap, BTreeSet};

const ALLOWED_HANDLERS: &[&str] = &[
    "onClick", "onChange", "onInput", "onSubmit", "onFocus", "onBlur", "onKeyDown", "onKeyUp",
];

const STANDARD_DOM: &[&str] = &[
    "class",
    "className",
    "value",
    "defaultValue",
    "defaultChecked",
    "id",
    "name",
    "type",
    "placeholder",
    "title",
    "role",
    "href",
    "src",
    "alt",
    "width",
    "height",
    "disabled",
    "required",
    "readOnly",
    "checked",
    "autoFocus",
    "autoComplete",
    "tabIndex",
    "htmlFor",
    "rows",
    "cols",
    "min",
    "max",
    "step",
    "maxLength",
    "minLength",
    "pattern",
    "multiple",
    "accept",
    "spellCheck",
    "wrap",
    "form",
    "label",
    "selected",
    "size",
];

pub struct ComponentOutcome {
    pub code: String,
    pub report: PassReport,
    pub changed: bool,
}

/// Promote raw interactive elements to their designated components and
/// add each component's import exactly once per file.
pub fn substitute_components(
    code: &str,
    tree: &Tree,
    table: &TokenTable,
    context: &ContextFiles,
) -> ComponentOutcome {
    let mut report = PassReport::new("components");
    // (start, end, replacement), applied right to left
    let mut edits: Vec<(usize, usize, String)> = Vec::new();
    // module -> components, deduped across occurrences
    let mut needed: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    tree.visit_elements(&mut |el| {
        let Some(mapping) = table.component_for(&el.tag_name) else {
            return;
        };
        if !context.is_empty() && !context.has_module(&mapping.module) {
            return;
        }
        if !promotable(el) {
            return;
        }

        edits.push((
            el.name_span.start,
            el.name_span.end,
            mapping.component.clone(),
        ));
        if let Some(close) = &el.close_name_span {
            edits.push((close.start, close.end, mapping.component.clone()));
        }
        needed
            .entry(mapping.module.clone())
            .or_default()
            .insert(mapping.component.clone());
        report.violations.push(Violation::new(
            format!("<{}>", mapping.element),
            format!("<{}>", mapping.component),
            "raw element promoted to its design-system component",
        ));
    });

    if edits.is_empty() {
        return ComponentOutcome {
            code: code.to_string(),
            report,
            changed: false,
        };
    }

    let mut new_imports: Vec<String> = Vec::new();
    for (module, components) in &needed {
        match tree.find_import(module) {
            Some(decl) => {
                let missing: Vec<&str> = components
                    .iter()
                    .map(String::as_str)
                    .filter(|c| !decl.has_named(c))
                    .collect();
                if missing.is_empty() {
                    continue;
                }
                match &decl.named_span {
                    Some(named) => {
                        let interior = &code[named.start..named.end];
                        let at = named.start + interior.trim_end().len();
                        let list: String = missing.iter().map(|c| format!(", {}", c)).collect();
                        edits.push((at, at, list));
                    }
                    None => new_imports.push(import_line(&missing, module)),
                }
            }
            None => {
                let all: Vec<&str> = components.iter().map(String::as_str).collect();
                new_imports.push(import_line(&all, module));
            }
        }
    }
    if !new_imports.is_empty() {
        let block = new_imports.join("\n");
        match tree.imports.last() {
            Some(last) => edits.push((last.span.end, last.span.end, format!("\n{}", block))),
            None => edits.push((0, 0, format!("{}\n", block))),
        }
    }

    edits.sort_by(|a, b| b.0.cmp(&a.0));
    let mut out = code.to_string();
    for (start, end, replacement) in edits {
        out.replace_range(start..end, &replacement);
    }

    ComponentOutcome {
        code: out,
        report,
        changed: true,
    }
}

fn promotable(el: &Element) -> bool {
    el.attributes.iter().all(|attr| match attr {
        Attribute::Named(named) => allowed_attribute(&named.name),
        Attribute::Spread(_) => false,
    })
}

fn allowed_attribute(name: &str) -> bool {
    if name == "ref" || name == "style" || name.starts_with("data-") {
        return false;
    }
    if name.starts_with("aria-") {
        return true;
    }
    STANDARD_DOM.contains(&name) || ALLOWED_HANDLERS.contains(&name)
}

fn import_line(components: &[&str], module: &str) -> String {
    format!(
        "import {{ {} }} from \"{}\";",
        components.join(", "),
        module
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_parser::parse_with_path;

    fn run(code: &str) -> ComponentOutcome {
        let tree = parse_with_path(code, "src/App.tsx").unwrap();
        substitute_components(code, &tree, &TokenTable::default(), &ContextFiles::empty())
    }

    #[test]
    fn promotes_and_imports_once() {
        let code = "const v = (\n  <div>\n    <button onClick={go}>One</button>\n    <button>Two</button>\n  </div>\n);\n";
        let out = run(code);
        assert!(out.changed);
        assert!(out.code.contains("<Button onClick={go}>One</Button>"));
        assert!(out.code.contains("<Button>Two</Button>"));
        assert_eq!(
            out.code
                .matches("import { Button } from \"@/components/ui/button\";")
                .count(),
            1
        );
        assert_eq!(out.report.violations.len(), 2);
    }

    #[test]
    fn vetoing_attributes_block_promotion() {
        for attr in [
            "ref={r}",
            "style={{ color }}",
            "data-test=\"x\"",
            "onMouseEnter={f}",
            "{...props}",
        ] {
            let code = format!("const v = <button {}>Go</button>;", attr);
            let out = run(&code);
            assert!(!out.changed, "expected veto for `{}`", attr);
            assert_eq!(out.code, code);
        }
    }

    #[test]
    fn aria_and_listed_handlers_are_allowed() {
        let code =
            "const v = <input aria-label=\"Search\" onChange={set} value={q} className=\"w-full\" />;";
        let out = run(code);
        assert!(out.changed);
        assert!(out.code.contains("<Input aria-label"));
        assert!(out.code.contains("import { Input } from \"@/components/ui/input\";"));
    }

    #[test]
    fn merges_into_an_existing_import() {
        let code = "import { buttonVariants } from \"@/components/ui/button\";\n\nconst v = <button>Go</button>;\n";
        let out = run(code);
        assert!(out
            .code
            .contains("import { buttonVariants, Button } from \"@/components/ui/button\";"));
        assert_eq!(out.code.matches("import").count(), 1);
    }

    #[test]
    fn existing_specifier_is_not_duplicated() {
        let code = "import { Button } from \"@/components/ui/button\";\n\nconst v = <button>Go</button>;\n";
        let out = run(code);
        assert!(out.code.contains("<Button>Go</Button>"));
        assert_eq!(out.code.matches("Button }").count(), 1);
    }

    #[test]
    fn context_files_gate_the_mapping() {
        let code = "const v = <button>Go</button>;";
        let tree = parse_with_path(code, "src/App.tsx").unwrap();

        let with = ContextFiles::new(["src/components/ui/button.tsx"]);
        let out = substitute_components(code, &tree, &TokenTable::default(), &with);
        assert!(out.changed);

        let without = ContextFiles::new(["src/pages/Home.tsx"]);
        let out = substitute_components(code, &tree, &TokenTable::default(), &without);
        assert!(!out.changed);
    }
}
