/// Creates the url friendly version of a name.
///
/// Lowercases the name and collapses every run of non-alphanumeric characters into a single `-`,
/// e.g. `Devworks Bootcamp` becomes `devworks-bootcamp`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[cfg(test)]
mod test {
    use super::slugify;

    #[test]
    fn slugifies_names() {
        assert_eq!("devworks-bootcamp", slugify("Devworks Bootcamp"));
        assert_eq!("modern-tech", slugify("  Modern   Tech  "));
        assert_eq!("codemasters-ui-ux", slugify("Codemasters: UI/UX!"));
        assert_eq!("", slugify("!!!"));
    }
}
