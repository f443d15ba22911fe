use crate::error::CliError;
use model::meta::SessionVariables;

/// Parses the `--variables` argument into session variables. The accepted
/// shape is a brace-wrapped list of `NAME: value` pairs; names and values
/// are upper-cased so they compare equal to metadata-store declarations.
pub fn parse_variables(input: &str) -> Result<SessionVariables, CliError> {
    let trimmed = input.trim();
    if !trimmed.starts_with('{') || !trimmed.ends_with('}') {
        return Err(CliError::InvalidVariables(
            "expected a brace-wrapped list like '{COBID: 20210401}'".to_string(),
        ));
    }

    let body = &trimmed[1..trimmed.len() - 1];
    let mut session = SessionVariables::new();
    for pair in body.split(',') {
        if pair.trim().is_empty() {
            continue;
        }
        let (name, value) = pair.split_once(':').ok_or_else(|| {
            CliError::InvalidVariables(format!("`{}` is not a `NAME: value` pair", pair.trim()))
        })?;
        let name = unquote(name).to_uppercase();
        let value = unquote(value).to_uppercase();
        if name.is_empty() {
            return Err(CliError::InvalidVariables(format!(
                "empty variable name in `{}`",
                pair.trim()
            )));
        }
        session.insert(name, value);
    }
    Ok(session)
}

fn unquote(token: &str) -> &str {
    token
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_and_quoted_pairs_parse_upper_cased() {
        let session = parse_variables("{COBID: 20210401, market: 'eu'}").unwrap();
        assert_eq!(session.get("COBID").map(String::as_str), Some("20210401"));
        assert_eq!(session.get("MARKET").map(String::as_str), Some("EU"));
    }

    #[test]
    fn empty_braces_yield_no_variables() {
        assert!(parse_variables("{}").unwrap().is_empty());
    }

    #[test]
    fn missing_braces_are_rejected() {
        assert!(matches!(
            parse_variables("COBID: 20210401"),
            Err(CliError::InvalidVariables(_))
        ));
    }

    #[test]
    fn pair_without_separator_is_rejected() {
        assert!(matches!(
            parse_variables("{COBID}"),
            Err(CliError::InvalidVariables(_))
        ));
    }
}
