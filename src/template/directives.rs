// ABOUTME: The fixed data-* directive passes applied to a parsed template
// ABOUTME: Conditionals, then text interpolation, then checklist expansion, in that order

use markup5ever_rcdom::Handle;
use serde_json::Value;
use tracing::{error, warn};

use super::dom;

pub const ATTR_IF: &str = "data-if";
pub const ATTR_CLASS_IF: &str = "data-class-if";
pub const ATTR_TEXT: &str = "data-text";
pub const ATTR_CHECKLIST_ITEM: &str = "data-checklist-item";
pub const ATTR_TASK_ID: &str = "data-task-id";
pub const ATTR_LABEL: &str = "data-label";
pub const ATTR_REQUIRED: &str = "data-required";

pub const COMPLETED_CLASS: &str = "completed";
pub const CHECKLIST_ITEM_CLASS: &str = "checklist-item";

/// Attributes that never survive a successful render
pub const DIRECTIVE_ATTRS: [&str; 6] = [
    ATTR_IF,
    ATTR_CLASS_IF,
    ATTR_TEXT,
    ATTR_CHECKLIST_ITEM,
    ATTR_LABEL,
    ATTR_REQUIRED,
];

/// Run every pass over `root`. The order matters: an element removed by a
/// conditional is never interpolated or expanded.
pub fn apply(root: &Handle, data: &Value) {
    process_conditionals(root, data);
    process_variables(root, data);
    process_checklist_items(root, data);
}

fn lookup<'a>(data: &'a Value, name: &str) -> Option<&'a Value> {
    data.as_object().and_then(|map| map.get(name))
}

/// Loose truthiness: false, null, 0, NaN and "" are falsy, everything else
/// (including empty objects and arrays) is truthy. Missing means falsy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Text form of a context value as it appears in rendered markup
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            // Negative zero prints as "0"
            Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
            _ => n.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

pub fn process_conditionals(root: &Handle, data: &Value) {
    for element in dom::elements_with_attr(root, ATTR_IF) {
        let condition = dom::get_attr(&element, ATTR_IF).unwrap_or_default();
        if is_truthy(lookup(data, &condition)) {
            dom::remove_attr(&element, ATTR_IF);
        } else {
            dom::detach(&element);
        }
    }

    for element in dom::elements_with_attr(root, ATTR_CLASS_IF) {
        let value = dom::get_attr(&element, ATTR_CLASS_IF).unwrap_or_default();
        match value.split_once(':') {
            Some((condition, class)) => {
                // Only the first two segments of "a:b:c" are used
                let class = class.split(':').next().unwrap_or_default().trim();
                if is_truthy(lookup(data, condition)) {
                    if class.is_empty() {
                        warn!("Empty class name in {}=\"{}\"", ATTR_CLASS_IF, value);
                    } else {
                        dom::add_class(&element, class);
                    }
                }
            }
            None => warn!(
                "Malformed {}=\"{}\": expected condition:className",
                ATTR_CLASS_IF, value
            ),
        }
        dom::remove_attr(&element, ATTR_CLASS_IF);
    }
}

/// Replace text of `data-text` elements whose variable is defined. Undefined
/// variables leave the template's placeholder text as is.
pub fn process_variables(root: &Handle, data: &Value) {
    for element in dom::elements_with_attr(root, ATTR_TEXT) {
        let variable = dom::get_attr(&element, ATTR_TEXT).unwrap_or_default();
        if let Some(value) = lookup(data, &variable) {
            dom::set_text(&element, &display_value(value));
        }
        dom::remove_attr(&element, ATTR_TEXT);
    }
}

pub fn process_checklist_items(root: &Handle, data: &Value) {
    for element in dom::elements_with_attr(root, ATTR_CHECKLIST_ITEM) {
        let task_id = dom::get_attr(&element, ATTR_TASK_ID).filter(|id| !id.is_empty());
        let label = dom::get_attr(&element, ATTR_LABEL).filter(|label| !label.is_empty());

        let (Some(task_id), Some(label)) = (task_id, label) else {
            error!(
                "Checklist item missing required attributes: {}",
                dom::describe(&element)
            );
            continue;
        };

        let required = dom::get_attr(&element, ATTR_REQUIRED).as_deref() == Some("true");
        let checked = is_truthy(lookup(data, "tasks").and_then(|tasks| tasks.get(&task_id)));

        expand_checklist_item(&element, &task_id, &label, required, checked);
    }
}

fn expand_checklist_item(element: &Handle, task_id: &str, label: &str, required: bool, checked: bool) {
    let class = if checked {
        format!("{} {}", CHECKLIST_ITEM_CLASS, COMPLETED_CLASS)
    } else {
        CHECKLIST_ITEM_CLASS.to_string()
    };
    dom::set_attr(element, "class", &class);
    dom::set_attr(element, ATTR_TASK_ID, task_id);

    let label_id = format!("{}-label", task_id);

    let mut checkbox_attrs = vec![
        ("type", "checkbox"),
        ("id", task_id),
        ("aria-describedby", label_id.as_str()),
    ];
    if checked {
        checkbox_attrs.push(("checked", "checked"));
    }
    let checkbox = dom::create_element("input", &checkbox_attrs);

    let label_element = dom::create_element("label", &[("for", task_id), ("id", label_id.as_str())]);
    dom::append_child(&label_element, dom::create_text(&format!("{} ", label)));
    if required {
        let marker = dom::create_element("strong", &[]);
        dom::set_text(&marker, "(required)");
        dom::append_child(&label_element, marker);
    }

    dom::clear_children(element);
    dom::append_child(element, checkbox);
    dom::append_child(element, label_element);

    dom::remove_attr(element, ATTR_CHECKLIST_ITEM);
    dom::remove_attr(element, ATTR_LABEL);
    dom::remove_attr(element, ATTR_REQUIRED);
}
