use super::context::CsObj;
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

// Monotone set of context-sensitive objects. Insertion order is kept so propagation is
// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointsToSet {
    objs: IndexSet<CsObj, FxBuildHasher>,
}

impl PointsToSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton(obj: CsObj) -> Self {
        let mut set = Self::new();
        set.add(obj);
        set
    }

    pub fn add(&mut self, obj: CsObj) -> bool {
        self.objs.insert(obj)
    }

    // Adds every object of `other` and returns the ones that were new.
    pub fn add_all(&mut self, other: &PointsToSet) -> PointsToSet {
        let mut delta = PointsToSet::new();
        for obj in other.iter() {
            if self.objs.insert(obj) {
                delta.add(obj);
            }
        }
        delta
    }

    // Objects of `self` missing from `other`.
    pub fn diff(&self, other: &PointsToSet) -> PointsToSet {
        let mut delta = PointsToSet::new();
        for obj in self.iter() {
            if !other.contains(obj) {
                delta.add(obj);
            }
        }
        delta
    }

    pub fn contains(&self, obj: CsObj) -> bool {
        self.objs.contains(&obj)
    }

    pub fn len(&self) -> usize {
        self.objs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = CsObj> + '_ {
        self.objs.iter().copied()
    }

    pub fn is_subset(&self, other: &PointsToSet) -> bool {
        self.objs.iter().all(|obj| other.contains(*obj))
    }
}

impl FromIterator<CsObj> for PointsToSet {
    fn from_iter<I: IntoIterator<Item = CsObj>>(iter: I) -> Self {
        let mut set = PointsToSet::new();
        for obj in iter {
            set.add(obj);
        }
        set
    }
}
