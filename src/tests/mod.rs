// Waypoint's Test Infrastructure
//
// Scenario tests for the locator, resolver, arbiter and listener. Small
// self-contained units keep their tests inline next to the code.

// ============================================================================
// SHARED HELPERS - Workspace fixtures and desktop doubles
// ============================================================================
pub mod helpers;



// ============================================================================
// RESOLUTION & NAVIGATION
// ============================================================================
pub mod navigation_tests; // Request parsing and navigation URIs
