/*! Test coverage for the IR model and the pointer analysis.
 *
 * The solver's answers only mean something if every stage underneath is right, so these tests
 * walk up the stack: builder and hierarchy, graph primitives, selectors, then whole-program
 * scenarios comparing context-insensitive and context-sensitive runs against CHA.
 */

#![allow(unused_imports)]

mod builder_tests;
mod pfg_tests;
mod selector_tests;
mod solver_tests;
