// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits that describe what the system
// works with: reviews, star ratings and predictions.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A review text with its star rating
pub mod review;

// Core abstractions (traits) that other layers implement
pub mod traits;
