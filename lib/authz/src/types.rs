//! Relationship tuple types shared by every store backend.

use std::fmt;

/// Entity kind for users.
const USER: &str = "user";
/// Entity kind for groups.
const GROUP: &str = "group";
/// Entity kind for namespaces.
const NAMESPACE: &str = "namespace";
/// Relation linking a user to a group.
const MEMBER: &str = "member";

/// A typed node in the relationship graph, written `kind:id`.
///
/// The id may carry a userset suffix (`group:eng#member`), which addresses
/// every member of the group rather than the group itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entity {
    /// Entity type (e.g. "user", "group", "namespace").
    pub kind: String,
    /// Entity ID; empty in a pattern means any ID of this kind.
    pub id: String,
}

impl Entity {
    /// Creates a new entity.
    #[must_use]
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a user entity keyed by email.
    #[must_use]
    pub fn user(email: impl Into<String>) -> Self {
        Self::new(USER, email)
    }

    /// Creates the userset of all members of a group.
    #[must_use]
    pub fn group_members(group: &str) -> Self {
        Self::new(GROUP, format!("{group}#{MEMBER}"))
    }

    /// Matches any group.
    #[must_use]
    pub fn any_group() -> Self {
        Self::new(GROUP, "")
    }

    /// Matches any namespace.
    #[must_use]
    pub fn any_namespace() -> Self {
        Self::new(NAMESPACE, "")
    }

    /// Parses a `kind:id` string.
    ///
    /// Returns `None` when there is no `:` or the kind is empty.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (kind, id) = value.split_once(':')?;
        if kind.is_empty() {
            return None;
        }
        Some(Self::new(kind, id))
    }

    /// Splits a userset id (`eng#member`) into the object id and relation.
    #[must_use]
    pub fn userset(&self) -> (&str, Option<&str>) {
        match self.id.split_once('#') {
            Some((id, relation)) => (id, Some(relation)),
            None => (&self.id, None),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// An `(object, relation, target)` fact in the relationship graph.
///
/// `user:alice -- member --> group:eng` reads "alice is a member of eng".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    /// The subject side of the relation.
    pub object: Entity,
    /// Relation name (e.g. "member", "reader", "writer").
    pub relation: String,
    /// The resource side of the relation.
    pub target: Entity,
}

impl Tuple {
    /// Creates a new tuple.
    #[must_use]
    pub fn new(object: Entity, relation: impl Into<String>, target: Entity) -> Self {
        Self {
            object,
            relation: relation.into(),
            target,
        }
    }
}

/// A partial tuple used to query the store.
///
/// An empty relation matches any relation; a target with an empty id
/// matches every entity of the target kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuplePattern {
    /// Exact subject to match.
    pub object: Entity,
    /// Relation filter, empty for any.
    pub relation: String,
    /// Target kind, optionally with an exact id.
    pub target: Entity,
}

impl TuplePattern {
    /// Groups the given user belongs to: `user:<email> -- * --> group:*`.
    #[must_use]
    pub fn user_groups(email: &str) -> Self {
        Self {
            object: Entity::user(email),
            relation: String::new(),
            target: Entity::any_group(),
        }
    }

    /// Namespaces granted to a group's members: `group:<g>#member -- * --> namespace:*`.
    #[must_use]
    pub fn group_namespaces(group: &str) -> Self {
        Self {
            object: Entity::group_members(group),
            relation: String::new(),
            target: Entity::any_namespace(),
        }
    }
}

/// One page of a paginated tuple query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TuplePage {
    /// Tuples in this page, at most the requested page size.
    pub tuples: Vec<Tuple>,
    /// Opaque cursor for the next page; empty when there are no more results.
    pub continuation_token: String,
}

/// A namespace grant held through a group, with the grant strength as the
/// raw relation name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceAccess {
    /// Namespace name.
    pub namespace: String,
    /// Relation name, e.g. "reader" or "writer".
    pub relation: String,
}

impl NamespaceAccess {
    /// Creates a new namespace grant.
    #[must_use]
    pub fn new(namespace: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            relation: relation.into(),
        }
    }
}
