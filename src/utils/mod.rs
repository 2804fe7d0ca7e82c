pub mod time;

const ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't',
    'u', 'v', 'w', 'x', 'y', 'z',
];

/// 9 lowercase alphanumerics, used as a disambiguating suffix.
pub fn shortid() -> String {
    nanoid::nanoid!(9, &ID_ALPHABET)
}

/// 21 character url-safe id.
pub fn longid() -> String {
    nanoid::nanoid!()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_shape() {
        let id = shortid();
        assert_eq!(id.len(), 9);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_eq!(longid().len(), 21);
        assert_ne!(longid(), longid());
    }
}
