use std::sync::OnceLock;

use regex::Regex;

/// `{{ scope.NAME }}` with an optional `| default("x")`
fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("placeholder pattern is valid")
    })
}

/// Expand `{{ env.VAR }}` placeholders in raw configuration text
///
/// `{{ env.VAR | default("x") }}` falls back to `x` when `VAR` is unset.
/// TOML comment lines are copied through untouched.
pub fn expand_env(input: &str) -> anyhow::Result<String> {
    let mut output = String::with_capacity(input.len());

    for (i, line) in input.lines().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }
        output.push_str(&expand_line(line)?);
    }

    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

fn expand_line(line: &str) -> anyhow::Result<String> {
    let mut result = String::with_capacity(line.len());
    let mut last_end = 0;

    for captures in placeholder().captures_iter(line) {
        let (Some(whole), Some(key)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        result.push_str(&line[last_end..whole.start()]);

        let Some(name) = key.as_str().strip_prefix("env.").filter(|name| !name.contains('.')) else {
            anyhow::bail!("only variables scoped with 'env.' are supported: `{}`", key.as_str());
        };

        match (std::env::var(name), captures.get(2)) {
            (Ok(value), _) => result.push_str(&value),
            (Err(_), Some(default)) => result.push_str(default.as_str()),
            (Err(_), None) => anyhow::bail!("environment variable not found: `{name}`"),
        }

        last_end = whole.end();
    }

    result.push_str(&line[last_end..]);
    Ok(result)
}
