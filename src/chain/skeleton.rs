use std::collections::HashMap;

use crate::error::ChainError;

/// Index of a configured bone in the host skeleton, resolved once at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub usize);

impl LinkId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for LinkId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Name lookup provided by the host skeleton.
pub trait Skeleton {
    fn bone_index(&self, name: &str) -> Option<usize>;
    fn bone_count(&self) -> usize;
}

/// Skeleton described only by its ordered bone names.
#[derive(Debug, Clone, Default)]
pub struct NamedSkeleton {
    names: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl NamedSkeleton {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut lookup = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            // First bone wins on duplicate names.
            lookup.entry(name.clone()).or_insert(index);
        }
        Self { names, lookup }
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }
}

impl Skeleton for NamedSkeleton {
    fn bone_index(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    fn bone_count(&self) -> usize {
        self.names.len()
    }
}

/// Maps configured bone names, root first, onto link identities.
pub fn resolve_links<S, N>(skeleton: &S, names: &[N]) -> Result<Vec<LinkId>, ChainError>
where
    S: Skeleton + ?Sized,
    N: AsRef<str>,
{
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            skeleton
                .bone_index(name)
                .filter(|&index| index < skeleton.bone_count())
                .map(LinkId)
                .ok_or_else(|| ChainError::UnresolvedBone {
                    name: name.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_in_order() {
        let skeleton = NamedSkeleton::new(["pelvis", "spine_01", "spine_02", "head"]);
        let links = resolve_links(&skeleton, &["spine_02", "spine_01"]).unwrap();
        assert_eq!(links, vec![LinkId(2), LinkId(1)]);
        assert_eq!(skeleton.name(3), Some("head"));
    }

    #[test]
    fn reports_first_missing_bone() {
        let skeleton = NamedSkeleton::new(["a", "b"]);
        let err = resolve_links(&skeleton, &["a", "tail_09", "zz"]).unwrap_err();
        assert_eq!(
            err,
            ChainError::UnresolvedBone {
                name: "tail_09".into()
            }
        );
    }
}
