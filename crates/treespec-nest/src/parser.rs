use chumsky::prelude::*;

/// A group as it appears in the source, tokens not yet classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawGroup {
    pub tokens: Vec<String>,
    pub max_children: u32,
}

pub(crate) fn nest_parser() -> impl Parser<char, Vec<RawGroup>, Error = Simple<char>> {
    // 0, 5, 12 ...
    let count = text::int(10).try_map(|s: String, span| {
        s.parse::<u32>()
            .map_err(|e| Simple::custom(span, format!("invalid child count {s:?}: {e}")))
    });

    // R, *, 3, or anything else the classifier will reject with a better message
    let token = none_of(".,{} \t\r\n")
        .repeated()
        .at_least(1)
        .collect::<String>()
        .padded();

    let path = token.separated_by(just('.')).at_least(1);

    // {R.*,3}
    let group = path
        .then_ignore(just(','))
        .then(count.padded())
        .delimited_by(just('{'), just('}'))
        .map(|(tokens, max_children)| RawGroup {
            tokens,
            max_children,
        });

    group.padded().repeated().at_least(1).then_ignore(end())
}
