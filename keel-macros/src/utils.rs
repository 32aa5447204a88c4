use proc_macro::{TokenStream, TokenTree};

/// Splits a `TokenStream` into comma-separated arguments.
///
/// Each argument is returned as a `Vec<TokenTree>`. Only top-level commas
/// separate arguments; commas inside groups stay in their group. Empty
/// arguments, such as the one after a trailing comma, are dropped.
pub(crate) fn split_args(input: TokenStream) -> Vec<Vec<TokenTree>> {
    let mut args = Vec::new();
    let mut current = Vec::new();

    for token in input {
        match &token {
            TokenTree::Punct(p) if p.as_char() == ',' => {
                if !current.is_empty() {
                    args.push(current);
                    current = Vec::new();
                }
            }
            _ => current.push(token),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}

/// Converts a slice of tokens back into Rust source.
pub(crate) fn tokens_to_string(tokens: &[TokenTree]) -> String {
    tokens.iter().cloned().collect::<TokenStream>().to_string()
}

/// Parses `key = value` pairs from an attribute argument list.
///
/// Pairs that do not have this shape are returned as errors so the macro
/// can report them.
pub(crate) fn parse_key_values(input: TokenStream) -> Result<Vec<(String, String)>, String> {
    let mut pairs = Vec::new();

    for arg in split_args(input) {
        match arg.as_slice() {
            [TokenTree::Ident(key), TokenTree::Punct(eq), value @ ..]
                if eq.as_char() == '=' && !value.is_empty() =>
            {
                pairs.push((key.to_string(), tokens_to_string(value)));
            }
            other => {
                return Err(format!(
                    "expected `key = value`, found `{}`",
                    tokens_to_string(other)
                ));
            }
        }
    }

    Ok(pairs)
}

/// Builds a `compile_error!` invocation carrying `message`.
pub(crate) fn compile_error(message: &str) -> TokenStream {
    format!("::core::compile_error!({message:?});")
        .parse()
        .unwrap_or_default()
}
