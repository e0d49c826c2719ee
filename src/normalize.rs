/// Canonical form used to compare free-text artist and album names.
///
/// Lower-cases, spells out `&`, unifies the curly apostrophe, drops every
/// character that is not a letter, digit, whitespace, apostrophe or hyphen and
/// collapses whitespace. The result is only ever compared, never shown.
pub fn normalize(value: &str) -> String {
    let lowered = value
        .to_lowercase()
        .replace('&', "and")
        .replace('\u{2019}', "'");
    let kept = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '\'' || *c == '-')
        .collect::<String>();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
