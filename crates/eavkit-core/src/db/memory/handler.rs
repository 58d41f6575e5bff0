use crate::{
    data::{Data, MemoryStore},
    db::query::{
        JoinAlias, Predicate, PredicateLeaf, QueryError, QueryHandler, ValueJoin,
        predicate::eval::eval,
    },
    obs::sink::{self, MetricsEvent},
    value::Value,
};
use eavkit_schema::node::Family;
use std::collections::BTreeMap;

///
/// MemoryHandler
///

#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryHandler;

impl MemoryHandler {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

///
/// MemoryQuery
///
/// Family restriction, the joined attributes and the translated filter.
/// A row matches when some choice of one value per join (or no value, for
/// an attribute with nothing stored) satisfies the filter.
///

#[derive(Clone, Debug, PartialEq)]
pub struct MemoryQuery {
    family: String,
    root_alias: String,
    joins: Vec<ValueJoin>,
    filter: Option<Predicate>,
}

impl MemoryQuery {
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    #[must_use]
    pub fn root_alias(&self) -> &str {
        &self.root_alias
    }

    #[must_use]
    pub fn joins(&self) -> &[ValueJoin] {
        &self.joins
    }

    #[must_use]
    pub const fn filter(&self) -> Option<&Predicate> {
        self.filter.as_ref()
    }

    /// Matching rows of the family, in id order, each at most once.
    #[must_use]
    pub fn execute<'s>(&self, store: &'s MemoryStore) -> Vec<&'s Data> {
        let mut scanned = 0_u64;
        let rows: Vec<_> = store
            .family_rows(&self.family)
            .inspect(|_| scanned += 1)
            .filter(|data| self.matches(data))
            .collect();

        sink::record(MetricsEvent::RowsScanned {
            family: &self.family,
            scanned,
            matched: u64::try_from(rows.len()).unwrap_or(u64::MAX),
        });

        rows
    }

    #[must_use]
    pub fn count(&self, store: &MemoryStore) -> usize {
        self.execute(store).len()
    }

    /// Whether `data` would be returned, ignoring the family restriction.
    #[must_use]
    pub fn matches(&self, data: &Data) -> bool {
        let Some(filter) = &self.filter else {
            return true;
        };

        let candidates: Vec<(&JoinAlias, Vec<Option<&Value>>)> = self
            .joins
            .iter()
            .map(|join| {
                let values = data.values(join.attribute.code());
                let options = if values.is_empty() {
                    vec![None]
                } else {
                    values.iter().map(Some).collect()
                };
                (&join.alias, options)
            })
            .collect();

        // odometer over one candidate per join
        let mut cursor = vec![0_usize; candidates.len()];
        loop {
            let binding: BTreeMap<JoinAlias, Option<&Value>> = candidates
                .iter()
                .zip(&cursor)
                .map(|((alias, options), &i)| ((*alias).clone(), options[i]))
                .collect();
            if eval(filter, &binding) {
                return true;
            }

            let mut pos = 0;
            loop {
                if pos == cursor.len() {
                    return false;
                }
                cursor[pos] += 1;
                if cursor[pos] < candidates[pos].1.len() {
                    break;
                }
                cursor[pos] = 0;
                pos += 1;
            }
        }
    }
}

impl QueryHandler for MemoryHandler {
    type Query = MemoryQuery;
    type Fragment = Predicate;

    fn base_query(&mut self, family: &Family, root_alias: &str) -> MemoryQuery {
        MemoryQuery {
            family: family.code().to_string(),
            root_alias: root_alias.to_string(),
            joins: Vec::new(),
            filter: None,
        }
    }

    fn join(&mut self, query: &mut MemoryQuery, join: &ValueJoin) -> Result<(), QueryError> {
        if !query.joins.iter().any(|j| j.alias == join.alias) {
            query.joins.push(join.clone());
        }

        Ok(())
    }

    fn leaf(&mut self, _: &mut MemoryQuery, leaf: &PredicateLeaf) -> Result<Predicate, QueryError> {
        Ok(Predicate::Leaf(leaf.clone()))
    }

    fn and(&mut self, _: &mut MemoryQuery, children: Vec<Predicate>) -> Predicate {
        Predicate::And(children)
    }

    fn or(&mut self, _: &mut MemoryQuery, children: Vec<Predicate>) -> Predicate {
        Predicate::Or(children)
    }

    fn filter(&mut self, query: &mut MemoryQuery, fragment: Predicate) {
        query.filter = Some(fragment);
    }
}
