mod utils;

use proc_macro::{Delimiter, Group, TokenStream, TokenTree};

const OK: &str = "::core::result::Result::<_, ::keel::Error>::Ok";

/// Waits for several keel futures of possibly different types.
///
/// `when_all!(a, b, c)` evaluates to a `Future<(Result<A>, Result<B>, Result<C>)>`
/// that resolves once every input is terminal. Outcomes keep their position;
/// a failure in one input never completes the others early.
#[proc_macro]
pub fn when_all(input: TokenStream) -> TokenStream {
    let args = utils::split_args(input);
    let count = args.len();

    if count == 0 {
        return utils::compile_error("when_all! needs at least one future");
    }

    let exprs: Vec<String> = args.iter().map(|arg| utils::tokens_to_string(arg)).collect();

    let output = if count == 1 {
        format!(
            "({}).then_wrapped(|mut __f| {OK}((__f.get(),)))",
            exprs[0]
        )
    } else {
        // when_both(f1, when_both(f2, ... when_both(fn-1, fn)))
        let mut nested = format!("({})", exprs[count - 1]);
        for expr in exprs[..count - 1].iter().rev() {
            nested = format!("::keel::when_both(({expr}), {nested})");
        }

        // (r1, Ok((r2, Ok((r3, r4))))) -> (r1, r2, r3, r4)
        let rest = |k: usize| {
            if k == count {
                format!("__r{k}")
            } else {
                format!("__rest{k}")
            }
        };

        let names: Vec<String> = (1..=count).map(|i| format!("__r{i}")).collect();
        let mut body = format!("{OK}(({},))", names.join(", "));
        for k in (2..count).rev() {
            body = format!("{}.and_then(|(__r{k}, {})| {body})", rest(k), rest(k + 1));
        }

        format!("{nested}.then(|(__r1, {})| {body})", rest(2))
    };

    output
        .parse()
        .unwrap_or_else(|err| utils::compile_error(&format!("when_all! macro error: {err}")))
}

/// Runs an `async` test body on a fresh keel runtime.
///
/// Accepts `task_quota_us = N` to configure the runtime's task quota.
///
/// ```rust,ignore
/// #[keel::test(task_quota_us = 0)]
/// async fn test_yields() {
///     keel::maybe_yield().await;
/// }
/// ```
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let options = match utils::parse_key_values(attr) {
        Ok(options) => options,
        Err(message) => return utils::compile_error(&message),
    };

    let mut builder = String::from("::keel::RuntimeBuilder::new()");

    for (key, value) in options {
        match key.as_str() {
            "task_quota_us" => builder.push_str(&format!(
                ".task_quota(::std::time::Duration::from_micros({value}))"
            )),
            other => {
                return utils::compile_error(&format!("unknown keel::test option `{other}`"));
            }
        }
    }

    builder.push_str(".build()");

    let mut tokens = item.into_iter().collect::<Vec<_>>();

    if let Some(pos) = tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "async"))
    {
        tokens.remove(pos);
    }

    let block_pos = tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace));

    let Some(pos) = block_pos else {
        return utils::compile_error("keel::test expects a function body");
    };

    let block = match &tokens[pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => return utils::compile_error("keel::test expects a function body"),
    };

    let new_block = format!(
        "{{
        let runtime = {builder}.expect(\"failed to build the test runtime\");
        runtime
            .block_on(async move {{ {block} }})
            .expect(\"test runtime stalled\")
    }}"
    );

    let body = match new_block.parse() {
        Ok(body) => body,
        Err(err) => return utils::compile_error(&format!("keel::test macro error: {err}")),
    };

    tokens[pos] = TokenTree::Group(Group::new(Delimiter::Brace, body));

    let test_attr: TokenStream = "#[test]".parse().unwrap_or_default();
    let mut result: Vec<TokenTree> = test_attr.into_iter().collect();
    result.extend(tokens);

    result.into_iter().collect()
}
