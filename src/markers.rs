//! Names of the markers the resolution engine inspects.
//!
//! Markers are attached to registered metadata through
//! [`MetadataBuilder`](crate::MetadataBuilder) and the member builders
//! ([`Constructor`](crate::Constructor), [`Parameter`](crate::Parameter),
//! [`StaticField`](crate::StaticField), [`Method`](crate::Method)).

/// Selects the default enum member, static field, factory method, or
/// constructor of a type.
pub const DEFAULT: &str = "Default";

/// Names the type to use as the implementation of an abstract type or an
/// interface. Unresolvable or incompatible names are ignored.
pub const IMPLEMENTED_BY: &str = "ImplementedBy";

/// Names the type an interface is bound to. Unlike [`IMPLEMENTED_BY`], an
/// unresolvable or incompatible name is an error.
pub const BIND_TO: &str = "BindTo";

/// Allows an interface to be synthesized when all of its methods have a
/// default body.
pub const DEFAULT_INTERFACE: &str = "DefaultInterface";

/// Makes the default of a type null.
pub const DEFAULT_TO_NULL: &str = "DefaultToNull";

/// Lets a plain parameter receive null when its type can't be resolved.
pub const NULLABLE: &str = "Nullable";

/// Runs a zero-argument instance method after a constructor creates a value.
pub const POST_CONSTRUCT: &str = "PostConstruct";
