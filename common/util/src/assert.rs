/// Asserts that each of the needles appears in the haystack, in the given order.
#[macro_export]
macro_rules! assert_contains_inorder {
    ($haystack:expr, [$($needle:expr),+ $(,)?]) => {{
        let haystack = &$haystack;
        let mut offset = 0;
        $(
            let needle = $needle;
            match haystack[offset..].find(needle) {
                Some(position) => {
                    offset += position + needle.len();
                }
                None => {
                    panic!(
                        "needle not found in order. needle: {:?}, searched from offset: {}, haystack: {:?}",
                        needle, offset, haystack
                    );
                }
            }
        )+
    }};
}
