//! REST API
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/api/basic/search_by_name` | GET | Search datasets by name |
//! | `/api/basic/get` | GET | Resolve one identifier |
//! | `/api/health` | GET | Registered datasets and cache size |

pub mod routes;

pub use routes::create_router;
