///! Channel name registry - collision resolution within one export run
///!
///! A base name seen once is emitted as-is. The second sighting renames the
///! first entry retroactively (cut to `max_length - 1` chars plus "1") and
///! every later sighting gets the running occurrence count appended.

use std::collections::{HashMap, HashSet};

/// An earlier entry whose already-emitted name must be replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetroRename {
    /// Position of the entry in the run's output
    pub index: usize,
    pub name: String,
}

/// Result of registering one base name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub rename: Option<RetroRename>,
}

#[derive(Debug, Clone, Default)]
struct RegistryEntry {
    count: usize,
    /// (assigned name, output index), in registration order
    assigned: Vec<(String, usize)>,
}

/// Base name → occurrences. Scoped to a single run.
#[derive(Debug, Clone)]
pub struct ChannelNameRegistry {
    max_length: usize,
    entries: HashMap<String, RegistryEntry>,
    /// Every name currently assigned, across all base names
    taken: HashSet<String>,
}

fn truncate(s: &str, len: usize) -> String {
    s.chars().take(len).collect()
}

impl ChannelNameRegistry {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            entries: HashMap::new(),
            taken: HashSet::new(),
        }
    }

    /// Occurrences of a base name so far
    pub fn count(&self, base: &str) -> usize {
        self.entries.get(base).map_or(0, |e| e.count)
    }

    /// Names currently assigned for a base name, in registration order
    pub fn assigned(&self, base: &str) -> Vec<(String, usize)> {
        self.entries.get(base).map(|e| e.assigned.clone()).unwrap_or_default()
    }

    /// Register `base` for the output entry at `index`.
    pub fn register(&mut self, base: &str, index: usize) -> Assignment {
        let Some(entry) = self.entries.get_mut(base) else {
            let mut entry = RegistryEntry::default();

            if self.taken.contains(base) {
                // already emitted as another base's numbered name
                entry.count = 1;
                let name = Self::next_numbered(&mut entry, base, self.max_length, &self.taken);
                entry.assigned.push((name.clone(), index));
                self.taken.insert(name.clone());
                self.entries.insert(base.to_string(), entry);
                return Assignment { name, rename: None };
            }

            entry.count = 1;
            entry.assigned.push((base.to_string(), index));
            self.taken.insert(base.to_string());
            self.entries.insert(base.to_string(), entry);
            return Assignment {
                name: base.to_string(),
                rename: None,
            };
        };

        let mut rename = None;

        if entry.count == 1 {
            let (original, original_index) = entry.assigned[0].clone();
            let renamed = truncate(&original, self.max_length.saturating_sub(1)) + "1";

            // keep the original when its numbered form belongs to someone else
            if original == base && !self.taken.contains(&renamed) {
                tracing::debug!("Retroactively renaming first instance: {} -> {}", original, renamed);
                self.taken.remove(&original);
                self.taken.insert(renamed.clone());
                entry.assigned[0] = (renamed.clone(), original_index);
                rename = Some(RetroRename {
                    index: original_index,
                    name: renamed,
                });
            }
        }

        let name = Self::next_numbered(entry, base, self.max_length, &self.taken);
        entry.assigned.push((name.clone(), index));
        self.taken.insert(name.clone());

        Assignment { name, rename }
    }

    /// Bump the counter and build `base[..max - len(count)] + count`,
    /// skipping counts whose name is already taken.
    ///
    /// The count itself is never cut, so once it has more digits than
    /// `max_length` the name is longer than the limit. Uniqueness wins.
    fn next_numbered(entry: &mut RegistryEntry, base: &str, max_length: usize, taken: &HashSet<String>) -> String {
        loop {
            entry.count += 1;
            let suffix = entry.count.to_string();
            let name = truncate(base, max_length.saturating_sub(suffix.len())) + &suffix;
            if !taken.contains(&name) {
                return name;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sighting_kept_as_is() {
        let mut registry = ChannelNameRegistry::new(7);
        let a = registry.register("ABPD", 0);
        assert_eq!(a.name, "ABPD");
        assert_eq!(a.rename, None);
        assert_eq!(registry.count("ABPD"), 1);
    }

    #[test]
    fn test_second_sighting_renames_first() {
        let mut registry = ChannelNameRegistry::new(7);
        registry.register("ABPD", 0);
        let b = registry.register("ABPD", 1);

        assert_eq!(b.name, "ABPD2");
        assert_eq!(
            b.rename,
            Some(RetroRename {
                index: 0,
                name: "ABPD1".to_string()
            })
        );

        let c = registry.register("ABPD", 2);
        assert_eq!(c.name, "ABPD3");
        assert_eq!(c.rename, None);
        assert_eq!(
            registry.assigned("ABPD"),
            vec![("ABPD1".to_string(), 0), ("ABPD2".to_string(), 1), ("ABPD3".to_string(), 2)]
        );
    }

    #[test]
    fn test_numbered_names_respect_max_length() {
        let mut registry = ChannelNameRegistry::new(7);
        let base = "SPRNGFD";
        registry.register(base, 0);
        let second = registry.register(base, 1);

        assert_eq!(second.rename.unwrap().name, "SPRNGF1");
        assert_eq!(second.name, "SPRNGF2");

        let mut last = String::new();
        for i in 2..12 {
            last = registry.register(base, i).name;
        }
        assert_eq!(last, "SPRNG12");
        assert!(registry.assigned(base).iter().all(|(n, _)| n.chars().count() <= 7));
    }

    #[test]
    fn test_count_wider_than_max_length() {
        let mut registry = ChannelNameRegistry::new(1);
        let mut names: Vec<String> = Vec::new();

        for i in 0..12 {
            let a = registry.register("Q", i);
            if let Some(rename) = a.rename {
                names[rename.index] = rename.name;
            }
            names.push(a.name);
        }

        assert_eq!(names[0], "1");
        assert_eq!(names[8], "9");
        assert_eq!(&names[9..], ["10", "11", "12"]);
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), 12);
    }

    #[test]
    fn test_many_collisions_are_unique() {
        let mut registry = ChannelNameRegistry::new(5);
        let mut names: Vec<String> = Vec::new();

        for i in 0..25 {
            let a = registry.register("QQQQQ", i);
            if let Some(rename) = a.rename {
                names[rename.index] = rename.name;
            }
            names.push(a.name);
        }

        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), 25);
    }

    #[test]
    fn test_cross_base_collision_stays_unique() {
        let mut registry = ChannelNameRegistry::new(7);
        registry.register("AB", 0);
        let second = registry.register("AB", 1);
        assert_eq!(second.name, "AB2");

        // a different base that equals an already numbered name
        let third = registry.register("AB2", 2);
        assert_ne!(third.name, "AB2");
        assert_eq!(third.name, "AB22");
    }
}
