use std::collections::BTreeMap;

/// Field-level validation failures, keyed by a form's field tag. An absent
/// key means the field is currently valid. Each validation pass replaces
/// the entries for the fields it covers rather than merging into them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F: Ord>(BTreeMap<F, String>);

impl<F: Ord + Copy> FieldErrors<F> {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Replace the entry for one field: `Some` records a failure, `None`
    /// marks the field valid again.
    pub fn set(&mut self, field: F, check: Option<String>) {
        match check {
            Some(message) => {
                self.0.insert(field, message);
            }
            None => {
                self.0.remove(&field);
            }
        }
    }

    pub fn message(&self, field: F) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl<F: Ord + Copy> Default for FieldErrors<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Required-text rule: passes when the trimmed value is non-empty.
pub fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Card number rule: 13 to 19 digits once all whitespace is stripped.
pub fn is_card_number(value: &str) -> bool {
    let digits: String = value.split_whitespace().collect();
    (13..=19).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

/// Expiry rule: month 01-12, optional slash, two-digit year.
pub fn is_expiry_date(value: &str) -> bool {
    let chars: Vec<char> = value.chars().collect();
    let (month, rest) = match chars.as_slice() {
        [m1, m2, rest @ ..] => ((*m1, *m2), rest),
        _ => return false,
    };

    let month_ok = match month {
        ('0', d) => ('1'..='9').contains(&d),
        ('1', d) => ('0'..='2').contains(&d),
        _ => false,
    };

    let year_ok = match rest {
        ['/', y1, y2] | [y1, y2] => y1.is_ascii_digit() && y2.is_ascii_digit(),
        _ => false,
    };

    month_ok && year_ok
}

/// CVV rule: all digits, length 3 or 4.
pub fn is_cvv(value: &str) -> bool {
    (3..=4).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit())
}

/// Password strength rule: at least 8 characters with one lowercase, one
/// uppercase, one digit and one special character (any non-alphanumeric,
/// underscore included).
pub fn is_strong_password(value: &str) -> bool {
    value.chars().count() >= 8
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| c == '_' || !c.is_alphanumeric())
}

/// Email shape rule: `local@domain.tld`, no whitespace, single `@`, domain
/// with an interior dot.
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.split_once('.') {
        Some((head, tail)) => !head.is_empty() && !tail.is_empty(),
        None => false,
    }
}
