/*!
 * # Editing Core
 *
 * The host side of the engine: a document buffer that applies the edits the
 * mark engine computes and keeps its range collection in step.
 *
 * ### 1. Single Source of Truth: xi-rope Buffer
 * - The entire document is stored in one **`xi_rope::Rope`** buffer
 * - Every change arrives as a validated [`ChangeSet`](crate::edit::ChangeSet)
 *   and is applied through its xi-rope **Delta**
 * - **Lossless round-trip**: `text()` returns the buffer verbatim
 *
 * ### 2. Copy-on-write Range Collection
 * - The collection lives behind an `Arc`; every change replaces it with a
 *   freshly parsed one instead of mutating ranges in place
 * - Readers holding the previous `Arc` keep a consistent snapshot
 *
 * ### 3. Selection Tracking
 * - Mark operations report their own selection
 * - Raw change sets map the selection through the delta
 *
 * ## Usage Pattern
 *
 * ```rust
 * use criticmark_engine::editing::Document;
 * use criticmark_engine::navigation::Direction;
 *
 * let mut doc = Document::from_bytes(b"hello world").unwrap();
 * doc.set_selection(5..5);
 * doc.suggest_insert(",").unwrap();
 * assert_eq!(doc.text(), "hello{++,++} world");
 *
 * doc.set_selection(doc.len()..doc.len());
 * doc.suggest_delete(Direction::Backward).unwrap();
 * assert_eq!(doc.text(), "hello{++,++} worl{--d--}");
 *
 * doc.accept_all().unwrap();
 * assert_eq!(doc.text(), "hello, worl");
 * ```
 */

pub mod document;
pub mod patch;

pub use document::Document;
pub use patch::Patch;
