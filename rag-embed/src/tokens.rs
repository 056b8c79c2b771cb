/// Rough token count used for budgeting and cost estimates: one token per
/// four characters, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("aaaa"), 1);
        assert_eq!(estimate_tokens("aaaaa"), 2);
        assert_eq!(estimate_tokens("ééé"), 1);
    }
}
