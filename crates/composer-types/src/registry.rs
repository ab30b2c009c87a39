//! Registry trait for self-registering implementations.

/// Base trait for implementation registries.
///
/// Each pluggable module (accounts, artifacts, delivery) provides a `Registry`
/// struct per implementation, declaring the name used in configuration files
/// and the factory that builds it.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation,
	/// e.g. "file" for `artifacts.implementations.file`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Returns the factory function for this implementation.
	fn factory() -> Self::Factory;
}
