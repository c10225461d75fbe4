//! Building and reading the literal bracketed text of a single range.

use criticmark_syntax::RangeKind;

use crate::metadata::MetadataFields;
use crate::range::CriticRange;

const BRACKET: usize = RangeKind::BRACKET_LEN;
const SEPARATOR: usize = RangeKind::SEPARATOR.len();

/// Output of [`construct_range`]: the markup plus two content offsets
/// translated into positions within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructedRange {
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// The decoded form of one range's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRange {
    pub kind: RangeKind,
    pub deleted: String,
    pub inserted: String,
    pub fields: MetadataFields,
}

/// Build the markup for one range.
///
/// Substitutions become `OPEN header deleted SEP inserted CLOSE`, every
/// other kind `OPEN header deleted inserted CLOSE`. Highlights and Comments
/// keep their content in `deleted`.
///
/// `start_offset` and `end_offset` index into `deleted + inserted`; the
/// returned offsets point at the same content characters in the output,
/// past the bracket, the header and (for offsets beyond the deleted text)
/// the separator.
pub fn construct_range(
    inserted: &str,
    deleted: &str,
    kind: RangeKind,
    fields: &MetadataFields,
    start_offset: usize,
    end_offset: usize,
) -> ConstructedRange {
    let header = header_for(kind, fields, deleted, inserted);
    let separator = match kind {
        RangeKind::Substitution => RangeKind::SEPARATOR,
        _ => "",
    };

    let text = format!(
        "{}{header}{deleted}{separator}{inserted}{}",
        kind.open(),
        kind.close()
    );

    let prefix = BRACKET + header.len();
    let translate = |offset: usize| {
        let offset = offset.min(deleted.len() + inserted.len());
        if kind == RangeKind::Substitution && offset > deleted.len() {
            prefix + offset + SEPARATOR
        } else {
            prefix + offset
        }
    };

    ConstructedRange {
        start_offset: translate(start_offset),
        end_offset: translate(end_offset),
        text,
    }
}

/// [`construct_range`] with the kind inferred from which sides are
/// non-empty. `None` when both are empty.
pub fn construct_suggestion(
    inserted: &str,
    deleted: &str,
    fields: &MetadataFields,
    start_offset: usize,
    end_offset: usize,
) -> Option<ConstructedRange> {
    let kind = infer_kind(inserted, deleted)?;
    Some(construct_range(
        inserted,
        deleted,
        kind,
        fields,
        start_offset,
        end_offset,
    ))
}

/// Substitution when both sides are present, else Addition or Deletion.
pub fn infer_kind(inserted: &str, deleted: &str) -> Option<RangeKind> {
    match (deleted.is_empty(), inserted.is_empty()) {
        (false, false) => Some(RangeKind::Substitution),
        (true, false) => Some(RangeKind::Addition),
        (false, true) => Some(RangeKind::Deletion),
        (true, true) => None,
    }
}

/// Re-encode an existing range.
pub fn encode_range(range: &CriticRange) -> String {
    let parts = range.parts();
    construct_range(parts.inserted, parts.deleted, range.kind, &range.fields, 0, 0).text
}

/// Decode text holding exactly one range and nothing else.
pub fn decode_range(text: &str) -> Option<DecodedRange> {
    let parsed = criticmark_syntax::ranges(text);
    let [only] = parsed.as_slice() else {
        return None;
    };
    if only.from != 0 || only.to != text.len() {
        return None;
    }

    let range = CriticRange::from_parsed(only);
    let parts = range.parts();
    Some(DecodedRange {
        kind: range.kind,
        deleted: parts.deleted.to_string(),
        inserted: parts.inserted.to_string(),
        fields: range.fields.clone(),
    })
}

/// The metadata header for new markup. Content that would itself read as a
/// header gets an empty `@@` in front of it.
fn header_for(kind: RangeKind, fields: &MetadataFields, deleted: &str, inserted: &str) -> String {
    let header = fields.header();
    if !header.is_empty() {
        return header;
    }
    let before_separator = match kind {
        RangeKind::Substitution => deleted.contains(RangeKind::METADATA_END),
        _ => format!("{deleted}{inserted}").contains(RangeKind::METADATA_END),
    };
    if before_separator {
        RangeKind::METADATA_END.to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn substitution_with_author() {
        let fields = MetadataFields::default().with_author("A");
        let built = construct_range("new", "old", RangeKind::Substitution, &fields, 0, 6);

        assert_eq!(built.text, "{~~author:A@@old~>new~~}");
        assert_eq!(built.start_offset, 13);
        assert_eq!(built.end_offset, 21);
        assert_eq!(&built.text[built.start_offset..built.end_offset], "old~>new");
    }

    #[rstest]
    #[case(RangeKind::Addition, "x", "", "{++x++}")]
    #[case(RangeKind::Deletion, "", "x", "{--x--}")]
    #[case(RangeKind::Highlight, "", "x", "{==x==}")]
    #[case(RangeKind::Comment, "", "x", "{>>x<<}")]
    #[case(RangeKind::Substitution, "b", "a", "{~~a~>b~~}")]
    fn plain_markup(
        #[case] kind: RangeKind,
        #[case] inserted: &str,
        #[case] deleted: &str,
        #[case] expected: &str,
    ) {
        let built = construct_range(inserted, deleted, kind, &MetadataFields::default(), 0, 0);
        assert_eq!(built.text, expected);
        assert_eq!(built.start_offset, 3);
    }

    #[test]
    fn offset_at_deleted_end_stays_before_separator() {
        let built = construct_range(
            "cd",
            "ab",
            RangeKind::Substitution,
            &MetadataFields::default(),
            2,
            3,
        );
        // {~~ab~>cd~~}
        assert_eq!(built.start_offset, 5);
        assert_eq!(built.end_offset, 8);
    }

    #[test]
    fn offsets_are_clamped_to_content() {
        let built = construct_range("x", "", RangeKind::Addition, &MetadataFields::default(), 0, 9);
        assert_eq!(built.end_offset, 4);
    }

    #[rstest]
    #[case("new", "", Some(RangeKind::Addition))]
    #[case("", "old", Some(RangeKind::Deletion))]
    #[case("new", "old", Some(RangeKind::Substitution))]
    #[case("", "", None)]
    fn kind_inference(
        #[case] inserted: &str,
        #[case] deleted: &str,
        #[case] expected: Option<RangeKind>,
    ) {
        let built = construct_suggestion(inserted, deleted, &MetadataFields::default(), 0, 0);
        assert_eq!(built.is_some(), expected.is_some());
        assert_eq!(infer_kind(inserted, deleted), expected);
    }

    #[test]
    fn decode_rejects_surrounding_text() {
        assert_eq!(decode_range("x{++a++}"), None);
        assert_eq!(decode_range("{++a++}{++b++}"), None);
        assert_eq!(decode_range("plain"), None);
    }

    #[rstest]
    #[case(RangeKind::Addition, "", "added text")]
    #[case(RangeKind::Deletion, "gone", "")]
    #[case(RangeKind::Substitution, "old words", "new words")]
    #[case(RangeKind::Highlight, "look here", "")]
    #[case(RangeKind::Comment, "a remark", "")]
    fn decode_inverts_construct(
        #[case] kind: RangeKind,
        #[case] deleted: &str,
        #[case] inserted: &str,
    ) {
        let fields = MetadataFields {
            author: Some("Doe, J.".to_string()),
            time: Some(1_700_000_000),
            done: Some(true),
            ..Default::default()
        };
        for fields in [MetadataFields::default(), fields] {
            let text = construct_range(inserted, deleted, kind, &fields, 0, 0).text;
            assert_eq!(
                decode_range(&text),
                Some(DecodedRange {
                    kind,
                    deleted: deleted.to_string(),
                    inserted: inserted.to_string(),
                    fields: fields.clone(),
                })
            );
        }
    }

    #[test]
    fn content_that_looks_like_metadata_survives() {
        let text = construct_range("a@@b", "", RangeKind::Addition, &MetadataFields::default(), 0, 0).text;
        assert_eq!(text, "{++@@a@@b++}");

        let decoded = decode_range(&text).unwrap();
        assert_eq!(decoded.inserted, "a@@b");
        assert!(decoded.fields.is_empty());
    }

    #[test]
    fn encode_range_normalises_aliases() {
        let range = CriticRange::from_parsed(&criticmark_syntax::ranges("{--a:Ann@@x--}")[0]);
        assert_eq!(encode_range(&range), "{--author:Ann@@x--}");
    }
}
