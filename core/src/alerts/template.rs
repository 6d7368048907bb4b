//! Placeholder substitution for text and TTS templates

use alertcast_types::AlertEvent;

/// Replace `{name}`-style placeholders with event values.
///
/// Known placeholders with no value render empty; unknown ones are kept
/// verbatim so user text containing braces survives.
pub fn render_template(template: &str, event: &AlertEvent) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match placeholder(key, event) {
            Some(value) => out.push_str(&value),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

fn placeholder(key: &str, event: &AlertEvent) -> Option<String> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let value = match key {
        "name" | "username" => event.username.clone(),
        "recipient" => text(&event.recipient),
        "amount" => event.amount.map(format_amount).unwrap_or_default(),
        "currency" => text(&event.currency),
        "game" => text(&event.game),
        "message" => text(&event.message),
        "monthsName" => text(&event.months_name),
        "tier" => text(&event.tier),
        _ => return None,
    };
    Some(value)
}

/// Whole amounts render without a decimal point
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{:.2}", amount)
    }
}
