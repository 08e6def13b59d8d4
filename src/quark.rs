use std::collections::HashMap;

/// Interns tag names into dense ids, in insertion order.
///
/// The decoder enumerates states by id, so the insertion order is also the
/// tie-break order of the Viterbi search.
#[derive(Debug, Default, Clone)]
pub struct Quark {
    v: Vec<String>,
    m: HashMap<String, usize>,
}

impl Quark {
    /// Returns the id of `key`, assigning the next free id on first sight.
    pub fn intern(&mut self, key: &str) -> usize {
        if let Some(&id) = self.m.get(key) {
            return id;
        }
        let id = self.v.len();
        self.m.insert(key.to_string(), id);
        self.v.push(key.to_string());
        id
    }

    pub fn id(&self, key: &str) -> Option<usize> {
        self.m.get(key).copied()
    }

    pub fn name(&self, id: usize) -> Option<&str> {
        self.v.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.v.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.v.iter().map(String::as_str)
    }
}

impl<'a> FromIterator<&'a str> for Quark {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut quark = Quark::default();
        for key in iter {
            quark.intern(key);
        }
        quark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_stable() {
        let mut quark = Quark::default();
        for (s, id) in [("START", 0), ("ART", 1), ("NN", 2), ("ART", 1), ("START", 0), ("$.", 3)] {
            assert_eq!(id, quark.intern(s), "{} != {}", s, id);
        }
        assert_eq!(quark.len(), 4);
    }

    #[test]
    fn lookups() {
        let quark: Quark = ["START", "ART", "NN", "ART"].into_iter().collect();
        assert_eq!(quark.id("NN"), Some(2));
        assert_eq!(quark.id("VVFIN"), None);
        assert_eq!(quark.name(0), Some("START"));
        assert_eq!(quark.name(3), None);
        assert_eq!(quark.iter().collect::<Vec<_>>(), vec!["START", "ART", "NN"]);
    }
}
