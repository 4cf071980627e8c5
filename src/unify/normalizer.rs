/// Post-processing for canonical tag names.
///
/// The unification prompt asks for title case, but model output drifts; this
/// keeps canonical names consistent regardless.
pub struct TagNormalizer;

impl TagNormalizer {
    /// Converts a tag to title case.
    ///
    /// # Normalization rules
    ///
    /// - Trims and collapses internal whitespace to single spaces
    /// - Upper-cases the first letter of each word
    /// - Leaves the rest of each word untouched, so acronyms survive
    ///
    /// # Examples
    ///
    /// ```
    /// use posttag::unify::TagNormalizer;
    ///
    /// assert_eq!(TagNormalizer::title_case("job search"), "Job Search");
    /// assert_eq!(TagNormalizer::title_case("  personal   growth "), "Personal Growth");
    /// assert_eq!(TagNormalizer::title_case("AI in hiring"), "AI In Hiring");
    /// ```
    #[must_use]
    pub fn title_case(tag: &str) -> String {
        tag.split_whitespace()
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Removes duplicate and blank tags, keeping first occurrences in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use posttag::unify::TagNormalizer;
    ///
    /// let tags = vec!["Job Search".to_string(), "".to_string(), "Job Search".to_string()];
    /// assert_eq!(TagNormalizer::dedup_tags(tags), vec!["Job Search"]);
    /// ```
    #[must_use]
    pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        tags.into_iter()
            .filter(|tag| !tag.trim().is_empty() && seen.insert(tag.clone()))
            .collect()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case_capitalizes_each_word() {
        assert_eq!(TagNormalizer::title_case("motivation"), "Motivation");
        assert_eq!(TagNormalizer::title_case("self improvement"), "Self Improvement");
        assert_eq!(TagNormalizer::title_case("scam alert"), "Scam Alert");
    }

    #[test]
    fn test_title_case_preserves_existing_capitals() {
        assert_eq!(TagNormalizer::title_case("Job Search"), "Job Search");
        assert_eq!(TagNormalizer::title_case("LinkedIn tips"), "LinkedIn Tips");
        assert_eq!(TagNormalizer::title_case("HR"), "HR");
    }

    #[test]
    fn test_title_case_collapses_whitespace() {
        assert_eq!(TagNormalizer::title_case("\tjob \n  search "), "Job Search");
        assert_eq!(TagNormalizer::title_case("   "), "");
    }

    #[test]
    fn test_title_case_non_ascii() {
        assert_eq!(TagNormalizer::title_case("éducation"), "Éducation");
        assert_eq!(TagNormalizer::title_case("नौकरी खोज"), "नौकरी खोज");
    }

    #[test]
    fn test_dedup_preserves_order_of_first_occurrence() {
        let tags = vec![
            "Scams".to_string(),
            "Job Search".to_string(),
            "Scams".to_string(),
            "  ".to_string(),
            "Motivation".to_string(),
        ];
        assert_eq!(
            TagNormalizer::dedup_tags(tags),
            vec!["Scams", "Job Search", "Motivation"]
        );
    }
}
