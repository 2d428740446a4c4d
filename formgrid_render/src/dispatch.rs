//! The one tag-dispatch table all framework renderers share.
//!
//! Markup differences between frameworks live entirely in
//! [`FrameworkStyle`]; the functions here decide structure. An `input` field
//! dispatches a second time on its `type` property, because checkboxes,
//! radios, and hidden inputs have different shapes, not just different
//! classes.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde_json::Value;

use formgrid_schema::Field;

use crate::options::{escape_html, parse_option_lines, value_text};
use crate::style::FrameworkStyle;

/// Renders one field of a known tag into framework-styled markup.
type RenderFn = fn(&Field, &dyn FrameworkStyle) -> String;

lazy_static! {
    static ref TAG_RENDERERS: HashMap<&'static str, RenderFn> = {
        let mut table: HashMap<&'static str, RenderFn> = HashMap::new();
        table.insert("input", render_input as RenderFn);
        table.insert("textarea", render_textarea);
        table.insert("select", render_select);
        table.insert("button", render_button);
        for tag in ["h1", "h2", "h3", "h4", "h5", "h6"] {
            table.insert(tag, render_heading);
        }
        table.insert("p", render_paragraph);
        table.insert("label", render_label_element);
        table.insert("a", render_link);
        table.insert("blockquote", render_blockquote);
        table.insert("pre", render_code_block);
        table.insert("ul", render_list);
        table.insert("ol", render_list);
        table.insert("div", render_block);
        table.insert("span", render_badge);
        table.insert("hr", render_divider);
        table.insert("fieldset", render_fieldset);
        table.insert("img", render_image);
        table.insert("video", render_media);
        table.insert("audio", render_media);
        table.insert("iframe", render_embed);
        table
    };
}

/// Tags the dispatch table can render, sorted.
pub fn supported_tags() -> Vec<&'static str> {
    let mut tags: Vec<&'static str> = TAG_RENDERERS.keys().copied().collect();
    tags.sort_unstable();
    tags
}

/// Render a field through the shared table. Unknown tags degrade to an HTML
/// comment placeholder so one stray field never sinks the whole document.
pub fn render_field(field: &Field, style: &dyn FrameworkStyle) -> String {
    match TAG_RENDERERS.get(field.html_tag.as_str()) {
        Some(render) => render(field, style),
        None => {
            log::warn!(
                "no renderer for tag '{}' (field '{}'), emitting placeholder",
                field.html_tag,
                field.id
            );
            format!(
                "<!-- unsupported element '{}' ({}) -->",
                escape_html(&field.html_tag),
                escape_html(&field.id)
            )
        }
    }
}

// --- attribute assembly ------------------------------------------------

/// Attribute keys must stay inside the quoted-attribute grammar; anything
/// else would let a crafted property key break out of the tag.
fn is_safe_attr_name(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

/// Append one HTML attribute: booleans become bare attributes or nothing,
/// empty strings and nulls are dropped, everything else is escaped text.
pub(crate) fn push_attr(out: &mut String, key: &str, value: &Value) {
    if !is_safe_attr_name(key) {
        log::debug!("dropping property with unsafe attribute name '{key}'");
        return;
    }
    match value {
        Value::Bool(true) => {
            out.push(' ');
            out.push_str(key);
        }
        Value::Bool(false) | Value::Null => {}
        Value::String(s) if s.trim().is_empty() => {}
        other => {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_html(&value_text(other)));
            out.push('"');
        }
    }
}

/// Every property as an HTML attribute, in document order, minus the keys a
/// render function consumes itself. `class` is always consumed: it merges
/// with the framework class instead of passing through.
fn passthrough_attrs(field: &Field, consumed: &[&str]) -> String {
    let mut out = String::new();
    for (key, value) in &field.properties {
        if key == "class" || consumed.contains(&key.as_str()) {
            continue;
        }
        push_attr(&mut out, key, value);
    }
    out
}

/// Attributes from an explicit key list, preserving the list's order.
fn picked_attrs(field: &Field, keys: &[&str]) -> String {
    let mut out = String::new();
    for key in keys {
        if let Some(value) = field.properties.get(*key) {
            push_attr(&mut out, key, value);
        }
    }
    out
}

/// ` class="framework custom"` from a framework class and the element's own
/// `class` property, or nothing when both are empty.
pub(crate) fn class_attr(base: &str, custom: Option<&str>) -> String {
    let custom = custom.map(str::trim).filter(|c| !c.is_empty());
    let combined = match (base.is_empty(), custom) {
        (false, Some(custom)) => format!("{base} {custom}"),
        (false, None) => base.to_string(),
        (true, Some(custom)) => custom.to_string(),
        (true, None) => return String::new(),
    };
    format!(" class=\"{}\"", escape_html(&combined))
}

/// Alpine directives stored on the field, emitted as attributes on the
/// interactive control.
fn alpine_attrs(field: &Field) -> String {
    let mut out = String::new();
    for (key, expression) in &field.alpine {
        if !is_safe_attr_name(key) {
            log::debug!("dropping alpine directive with unsafe name '{key}'");
            continue;
        }
        if expression.trim().is_empty() {
            continue;
        }
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_html(expression));
        out.push('"');
    }
    out
}

fn meta_text<'a>(field: &'a Field, key: &str) -> Option<&'a str> {
    match field.meta.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
        _ => None,
    }
}

fn label_fragment(field: &Field, style: &dyn FrameworkStyle, target: Option<&str>) -> String {
    let Some(label) = meta_text(field, "label") else {
        return String::new();
    };
    let for_attr = match target {
        Some(id) => format!(" for=\"{}\"", escape_html(id)),
        None => String::new(),
    };
    format!(
        "<label{}{}>{}</label>",
        class_attr(style.label_class(), None),
        for_attr,
        escape_html(label)
    )
}

fn hint_fragment(field: &Field, style: &dyn FrameworkStyle) -> String {
    match meta_text(field, "hint") {
        Some(hint) => format!(
            "<div{}>{}</div>",
            class_attr(style.hint_class(), None),
            escape_html(hint)
        ),
        None => String::new(),
    }
}

/// Standard field shell: wrapper div (with the preview marker), optional
/// label, the control itself, optional hint.
fn wrap_field(field: &Field, style: &dyn FrameworkStyle, inner: String) -> String {
    format!(
        "<div{}{}>{}</div>",
        class_attr(style.field_wrapper_class(), None),
        style.element_marker(&field.id),
        inner
    )
}

fn labelled_control(field: &Field, style: &dyn FrameworkStyle, control: String) -> String {
    let mut inner = label_fragment(field, style, Some(&field.id));
    inner.push_str(&control);
    inner.push_str(&hint_fragment(field, style));
    wrap_field(field, style, inner)
}

// --- per-tag render functions ------------------------------------------

fn render_input(field: &Field, style: &dyn FrameworkStyle) -> String {
    let input_type = field.property_str("type").unwrap_or("text").to_string();
    match input_type.as_str() {
        "hidden" => return render_hidden_input(field),
        "checkbox" | "radio" => return render_check_input(field, style, &input_type),
        _ => {}
    }
    let control = format!(
        "<input type=\"{}\" id=\"{}\"{}{}{}>",
        escape_html(&input_type),
        escape_html(&field.id),
        passthrough_attrs(field, &["type", "options", "inline"]),
        class_attr(style.input_class(), field.property_str("class")),
        alpine_attrs(field),
    );
    labelled_control(field, style, control)
}

/// Hidden inputs carry data, not UI: no wrapper, no label, no framework
/// classes.
fn render_hidden_input(field: &Field) -> String {
    format!(
        "<input type=\"hidden\" id=\"{}\"{}>",
        escape_html(&field.id),
        picked_attrs(field, &["name", "value"]),
    )
}

/// Single checkboxes/radios and whole option groups share this path: a field
/// with an `options` property renders one check per option line.
fn render_check_input(field: &Field, style: &dyn FrameworkStyle, input_type: &str) -> String {
    let shared = picked_attrs(field, &["name", "required", "disabled"]);
    let inline = matches!(field.properties.get("inline"), Some(Value::Bool(true)));

    if let Some(raw_options) = field.property_str("options") {
        let selected = field.property_str("value").unwrap_or("");
        let mut checks = String::new();
        for (index, option) in parse_option_lines(raw_options).iter().enumerate() {
            let option_id = format!("{}-{}", field.id, index + 1);
            let checked = if input_type == "radio" && !selected.is_empty() && option.value == selected
            {
                " checked"
            } else {
                ""
            };
            checks.push_str(&format!(
                "<div{}><input type=\"{}\" id=\"{}\" value=\"{}\"{}{}{}><label{} for=\"{}\">{}</label></div>",
                class_attr(&style.check_wrapper_class(inline), None),
                escape_html(input_type),
                escape_html(&option_id),
                escape_html(&option.value),
                shared,
                checked,
                class_attr(style.check_input_class(), field.property_str("class")),
                class_attr(style.check_label_class(), None),
                escape_html(&option_id),
                escape_html(&option.label),
            ));
        }
        let mut inner = label_fragment(field, style, None);
        inner.push_str(&checks);
        inner.push_str(&hint_fragment(field, style));
        return wrap_field(field, style, inner);
    }

    let control = format!(
        "<div{}><input type=\"{}\" id=\"{}\"{}{}{}{}><label{} for=\"{}\">{}</label></div>",
        class_attr(&style.check_wrapper_class(inline), None),
        escape_html(input_type),
        escape_html(&field.id),
        shared,
        picked_attrs(field, &["value", "checked"]),
        class_attr(style.check_input_class(), field.property_str("class")),
        alpine_attrs(field),
        class_attr(style.check_label_class(), None),
        escape_html(&field.id),
        escape_html(meta_text(field, "label").unwrap_or_default()),
    );
    wrap_field(field, style, control + &hint_fragment(field, style))
}

fn render_textarea(field: &Field, style: &dyn FrameworkStyle) -> String {
    let control = format!(
        "<textarea id=\"{}\"{}{}{}>{}</textarea>",
        escape_html(&field.id),
        passthrough_attrs(field, &["value", "options"]),
        class_attr(style.textarea_class(), field.property_str("class")),
        alpine_attrs(field),
        escape_html(field.property_str("value").unwrap_or_default()),
    );
    labelled_control(field, style, control)
}

fn render_select(field: &Field, style: &dyn FrameworkStyle) -> String {
    let selected = field.property_str("value").unwrap_or("");
    let mut options_markup = String::new();
    for option in parse_option_lines(field.property_str("options").unwrap_or_default()) {
        let marker = if !selected.is_empty() && option.value == selected {
            " selected"
        } else {
            ""
        };
        options_markup.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            escape_html(&option.value),
            marker,
            escape_html(&option.label),
        ));
    }
    let control = format!(
        "<select id=\"{}\"{}{}{}>{}</select>",
        escape_html(&field.id),
        passthrough_attrs(field, &["options", "value"]),
        class_attr(style.select_class(), field.property_str("class")),
        alpine_attrs(field),
        options_markup,
    );
    labelled_control(field, style, control)
}

fn render_button(field: &Field, style: &dyn FrameworkStyle) -> String {
    let button_type = field.property_str("type").unwrap_or("button");
    let control = format!(
        "<button type=\"{}\" id=\"{}\"{}{}{}>{}</button>",
        escape_html(button_type),
        escape_html(&field.id),
        passthrough_attrs(field, &["type", "text"]),
        class_attr(&style.button_class(button_type), field.property_str("class")),
        alpine_attrs(field),
        escape_html(field.property_str("text").unwrap_or("Button")),
    );
    labelled_control(field, style, control)
}

/// Alignment either maps to a framework class or falls back to an inline
/// `text-align` style; `left` is the default and emits nothing extra.
fn alignment(field: &Field, style: &dyn FrameworkStyle) -> (Option<String>, String) {
    let align = field.property_str("align").unwrap_or("left");
    if align == "left" {
        return (None, String::new());
    }
    match style.align_class(align) {
        Some(class) => (Some(class), String::new()),
        None => (None, format!(" style=\"text-align:{}\"", escape_html(align))),
    }
}

fn render_heading(field: &Field, style: &dyn FrameworkStyle) -> String {
    let tag = field
        .properties
        .get("level")
        .map(value_text)
        .and_then(|level| level.trim().parse::<u8>().ok())
        .filter(|level| (1..=6).contains(level))
        .map(|level| format!("h{level}"))
        .unwrap_or_else(|| field.html_tag.clone());
    let (align_class, align_style) = alignment(field, style);
    let classes = merge_classes(align_class.as_deref(), field.property_str("class"));
    let element = format!(
        "<{tag}{}{}>{}</{tag}>",
        class_attr(&classes, None),
        align_style,
        escape_html(field.property_str("text").unwrap_or_default()),
    );
    wrap_field(field, style, element)
}

fn render_paragraph(field: &Field, style: &dyn FrameworkStyle) -> String {
    let (align_class, align_style) = alignment(field, style);
    let classes = merge_classes(align_class.as_deref(), field.property_str("class"));
    let element = format!(
        "<p{}{}>{}</p>",
        class_attr(&classes, None),
        align_style,
        escape_html(field.property_str("text").unwrap_or_default()),
    );
    wrap_field(field, style, element)
}

fn render_label_element(field: &Field, style: &dyn FrameworkStyle) -> String {
    let element = format!(
        "<label{}{}>{}</label>",
        class_attr(style.label_class(), field.property_str("class")),
        picked_attrs(field, &["for"]),
        escape_html(field.property_str("text").unwrap_or_default()),
    );
    wrap_field(field, style, element)
}

fn render_link(field: &Field, style: &dyn FrameworkStyle) -> String {
    let element = format!(
        "<a{}{}>{}</a>",
        picked_attrs(field, &["href", "target"]),
        class_attr("", field.property_str("class")),
        escape_html(field.property_str("text").unwrap_or_default()),
    );
    wrap_field(field, style, element)
}

fn render_blockquote(field: &Field, style: &dyn FrameworkStyle) -> String {
    let element = format!(
        "<blockquote{}{}>{}</blockquote>",
        picked_attrs(field, &["cite"]),
        class_attr("", field.property_str("class")),
        escape_html(field.property_str("text").unwrap_or_default()),
    );
    wrap_field(field, style, element)
}

fn render_code_block(field: &Field, style: &dyn FrameworkStyle) -> String {
    let language = field.property_str("language").unwrap_or_default();
    let code_class = if language.is_empty() {
        String::new()
    } else {
        format!(" class=\"language-{}\"", escape_html(language))
    };
    let element = format!(
        "<pre{}><code{}>{}</code></pre>",
        class_attr("", field.property_str("class")),
        code_class,
        escape_html(field.property_str("code").unwrap_or_default()),
    );
    wrap_field(field, style, element)
}

fn render_list(field: &Field, style: &dyn FrameworkStyle) -> String {
    let tag = if matches!(field.properties.get("ordered"), Some(Value::Bool(true))) {
        "ol"
    } else {
        "ul"
    };
    let items: String = field
        .property_str("items")
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<li>{}</li>", escape_html(line)))
        .collect();
    let element = format!(
        "<{tag}{}>{}</{tag}>",
        class_attr("", field.property_str("class")),
        items
    );
    wrap_field(field, style, element)
}

/// Generic `div` fields: alerts carry a `variant`, spacers a `height`, cards
/// a `title`; anything else is a plain styled container.
fn render_block(field: &Field, style: &dyn FrameworkStyle) -> String {
    let element = if let Some(variant) = field.property_str("variant") {
        format!(
            "<div{}>{}</div>",
            class_attr(
                &style.variant_class("alert", variant),
                field.property_str("class")
            ),
            escape_html(field.property_str("text").unwrap_or_default()),
        )
    } else if let Some(height) = field.properties.get("height") {
        let pixels = value_text(height).trim().parse::<f64>().unwrap_or(24.0);
        format!(
            "<div{} style=\"height:{pixels}px\"></div>",
            class_attr("", field.property_str("class")),
        )
    } else if let Some(title) = field.property_str("title") {
        format!(
            "<div{}><h3>{}</h3></div>",
            class_attr(style.card_class(), field.property_str("class")),
            escape_html(title),
        )
    } else {
        format!(
            "<div{}>{}</div>",
            class_attr("", field.property_str("class")),
            escape_html(field.property_str("text").unwrap_or_default()),
        )
    };
    wrap_field(field, style, element)
}

fn render_badge(field: &Field, style: &dyn FrameworkStyle) -> String {
    let variant = field.property_str("variant").unwrap_or("info");
    let element = format!(
        "<span{}>{}</span>",
        class_attr(
            &style.variant_class("badge", variant),
            field.property_str("class")
        ),
        escape_html(field.property_str("text").unwrap_or_default()),
    );
    wrap_field(field, style, element)
}

fn render_divider(field: &Field, style: &dyn FrameworkStyle) -> String {
    let element = format!("<hr{}>", class_attr("", field.property_str("class")));
    wrap_field(field, style, element)
}

fn render_fieldset(field: &Field, style: &dyn FrameworkStyle) -> String {
    let legend = match field.property_str("legend") {
        Some(legend) => format!("<legend>{}</legend>", escape_html(legend)),
        None => String::new(),
    };
    let element = format!(
        "<fieldset{}>{}</fieldset>",
        class_attr("", field.property_str("class")),
        legend
    );
    wrap_field(field, style, element)
}

fn render_image(field: &Field, style: &dyn FrameworkStyle) -> String {
    let element = format!(
        "<img{}{}>",
        picked_attrs(field, &["src", "alt", "width", "height"]),
        class_attr("", field.property_str("class")),
    );
    labelled_control(field, style, element)
}

fn render_media(field: &Field, style: &dyn FrameworkStyle) -> String {
    let tag = field.html_tag.as_str();
    let element = format!(
        "<{tag}{}{}></{tag}>",
        passthrough_attrs(field, &[]),
        class_attr("", field.property_str("class")),
    );
    labelled_control(field, style, element)
}

fn render_embed(field: &Field, style: &dyn FrameworkStyle) -> String {
    let element = format!(
        "<iframe{}{}></iframe>",
        picked_attrs(field, &["src", "title", "width", "height", "allowfullscreen"]),
        class_attr("", field.property_str("class")),
    );
    labelled_control(field, style, element)
}

fn merge_classes(first: Option<&str>, second: Option<&str>) -> String {
    match (first, second) {
        (Some(a), Some(b)) => format!("{a} {b}"),
        (Some(a), None) => a.to_string(),
        (None, Some(b)) => b.to_string(),
        (None, None) => String::new(),
    }
}
