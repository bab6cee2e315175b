use std::sync::OnceLock;

use fanout_core::endpoint::Environment;
use regex::Regex;

use crate::error::CliError;

fn env_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid env name regex"))
}

/// Parse a `KEY=VALUE` binding from the command line.
pub fn parse_env_binding(raw: &str) -> Result<(String, String), CliError> {
    let (k, v) = raw
        .split_once('=')
        .ok_or_else(|| CliError::InvalidEnv(raw.to_string()))?;
    let key = k.trim();
    if !env_name_re().is_match(key) {
        return Err(CliError::InvalidEnv(raw.to_string()));
    }
    Ok((key.to_string(), v.to_string()))
}

/// Read a dotenv-style file: `KEY=VALUE` lines, `#` comments, blank lines
/// skipped, optionally quoted values.
pub fn parse_env_file(path: &str) -> Result<Environment, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::EnvFile(format!("failed to read {}: {}", path, e)))?;
    let mut out = Environment::new();

    for (idx, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (k, v) = line.split_once('=').ok_or_else(|| {
            CliError::EnvFile(format!(
                "{}: invalid line {} (expected KEY=VALUE)",
                path,
                idx + 1
            ))
        })?;
        let key = k.trim();
        if !env_name_re().is_match(key) {
            return Err(CliError::EnvFile(format!(
                "{}: invalid variable name '{}' at line {}",
                path,
                key,
                idx + 1
            )));
        }
        let value = parse_env_value(v.trim(), path, idx + 1)?;
        out.set(key, value);
    }

    Ok(out)
}

fn parse_env_value(value: &str, path: &str, line_no: usize) -> Result<String, CliError> {
    if value.len() >= 2 {
        let quoted = (value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\''));
        if quoted {
            let inner = &value[1..value.len() - 1];
            return unescape_env_value(inner, path, line_no);
        }
    }
    Ok(value.to_string())
}

fn unescape_env_value(value: &str, path: &str, line_no: usize) -> Result<String, CliError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(next) = chars.next() else {
            return Err(CliError::EnvFile(format!(
                "{}: invalid escape at line {} (trailing backslash)",
                path, line_no
            )));
        };
        match next {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            other => out.push(other),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_splits_on_first_equals() {
        assert_eq!(
            parse_env_binding("URL=http://x?a=b").unwrap(),
            ("URL".to_string(), "http://x?a=b".to_string())
        );
    }

    #[test]
    fn binding_rejects_bad_names() {
        for raw in ["NOEQUALS", "1ABC=x", "A-B=x", "=x"] {
            assert!(parse_env_binding(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn env_file_skips_comments_and_unquotes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "# release settings\n\nexport STAGE=prod\nGREETING=\"hello\\tworld\"\nNAME='shop'\n",
        )
        .unwrap();

        let env = parse_env_file(path.to_str().unwrap()).unwrap();
        assert_eq!(env.get("STAGE"), Some("prod"));
        assert_eq!(env.get("GREETING"), Some("hello\tworld"));
        assert_eq!(env.get("NAME"), Some("shop"));
    }

    #[test]
    fn env_file_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "A=1\nbroken\n").unwrap();

        let err = parse_env_file(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }
}
