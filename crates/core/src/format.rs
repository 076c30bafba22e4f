use crate::domain::answer::FormattedAnswer;

pub const QUICK_MARKER: &str = "Quick Answer";
pub const WATCH_MARKER: &str = "What to Watch Out For";
pub const NEXT_MARKER: &str = "Smart Next Steps";

/// Partitions a raw reply into the three headed sections the generation
/// prompt asks for. This is a positional slice on the first occurrence of
/// each marker, not a structural parse: a marker phrase recurring inside a
/// section body will shift the cut points. Anything that does not carry all
/// three markers in reading order renders as a single unstructured block.
pub fn split_sections(raw: &str) -> FormattedAnswer {
    let safe = raw.trim();

    let (Some(quick_at), Some(watch_at), Some(next_at)) = (
        find_ignore_ascii_case(safe, QUICK_MARKER),
        find_ignore_ascii_case(safe, WATCH_MARKER),
        find_ignore_ascii_case(safe, NEXT_MARKER),
    ) else {
        return FormattedAnswer::unstructured(safe);
    };

    if !(quick_at < watch_at && watch_at < next_at) {
        return FormattedAnswer::unstructured(safe);
    }

    FormattedAnswer {
        quick: strip_marker(&safe[quick_at..watch_at], QUICK_MARKER),
        watch: strip_marker(&safe[watch_at..next_at], WATCH_MARKER),
        next: strip_marker(&safe[next_at..], NEXT_MARKER),
        has_structured: true,
    }
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`.
/// Markers are plain ASCII, so a match always lands on a char boundary.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if h.len() < n.len() {
        return None;
    }
    h.windows(n.len()).position(|w| w.eq_ignore_ascii_case(n))
}

fn strip_marker(segment: &str, marker: &str) -> String {
    // The segment starts at the marker match, so the prefix to drop has
    // exactly the marker's length.
    segment[marker.len()..].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_the_three_headed_sections() {
        let raw = "Quick Answer\n- A\nWhat To Watch Out For\n- B\nSmart Next Steps\n- C";
        let out = split_sections(raw);
        assert!(out.has_structured);
        assert_eq!(out.quick, "- A");
        assert_eq!(out.watch, "- B");
        assert_eq!(out.next, "- C");
    }

    #[test]
    fn markers_match_case_insensitively() {
        let raw = "quick answer\nfast\nwhat to watch out for\ncareful\nsmart next steps\ngo";
        let out = split_sections(raw);
        assert!(out.has_structured);
        assert_eq!(out.quick, "fast");
        assert_eq!(out.watch, "careful");
        assert_eq!(out.next, "go");
    }

    #[test]
    fn missing_marker_falls_back_to_one_block() {
        let raw = "  Here is some advice without headings.  ";
        let out = split_sections(raw);
        assert!(!out.has_structured);
        assert_eq!(out.quick, "Here is some advice without headings.");
        assert_eq!(out.watch, "");
        assert_eq!(out.next, "");
    }

    #[test]
    fn partial_markers_fall_back_to_one_block() {
        let raw = "Quick Answer\n- A\nSmart Next Steps\n- C";
        let out = split_sections(raw);
        assert!(!out.has_structured);
        assert_eq!(out.quick, raw);
    }

    #[test]
    fn out_of_order_markers_fall_back_to_one_block() {
        let raw = "Smart Next Steps\n- C\nQuick Answer\n- A\nWhat to Watch Out For\n- B";
        let out = split_sections(raw);
        assert!(!out.has_structured);
        assert_eq!(out.quick, raw.trim());
    }

    #[test]
    fn leading_prose_before_the_first_marker_is_dropped() {
        // The first slice begins at the marker, so anything before it drops.
        let raw = "Sure!\nQuick Answer\n- A\nWhat to Watch Out For\n- B\nSmart Next Steps\n- C";
        let out = split_sections(raw);
        assert!(out.has_structured);
        assert_eq!(out.quick, "- A");
    }

    #[test]
    fn reinserting_headings_reconstructs_the_structure() {
        let raw = "Quick Answer\n- A1\n- A2\nWhat to Watch Out For\n- B\nSmart Next Steps\n- C";
        let out = split_sections(raw);
        let rebuilt = format!(
            "{QUICK_MARKER}\n{}\n{WATCH_MARKER}\n{}\n{NEXT_MARKER}\n{}",
            out.quick, out.watch, out.next
        );
        assert_eq!(rebuilt, raw);
    }

    #[test]
    fn empty_input_is_unstructured_and_empty() {
        let out = split_sections("");
        assert!(!out.has_structured);
        assert_eq!(out.quick, "");
    }
}
