//! Evaluation semantics over the bundled command set: sequencing,
//! conditionals, laziness, alias user arguments, and the depth guard.

mod common;

use common::{context, eval};
use scrip::{parse, STATUS_FAULT, STATUS_NOT_FOUND, STATUS_OK};

#[test]
fn series_concatenates_output_and_keeps_last_status() {
    let out = eval("echo x ; status 4 ; echo z");
    assert_eq!(out.output(), "xz");
    assert_eq!(out.status(), STATUS_OK);

    let out = eval("echo x ; echo z ; status 4");
    assert_eq!(out.output(), "xz");
    assert_eq!(out.status(), 4);
}

#[test]
fn conditional_branch_selection() {
    assert_eq!(eval("status 0 ? echo yes : echo no").output(), "yes");
    assert_eq!(eval("status 1 ? echo yes : echo no").output(), "no");
    assert_eq!(eval("status 1 ! echo recovered").output(), "recovered");
    assert_eq!(eval("status 0 ! echo recovered ; echo after").output(), "after");
}

#[test]
fn unmatched_conditional_passes_condition_through() {
    let out = eval("status 4 ? echo never");
    assert_eq!(out.status(), 4);
    assert_eq!(out.output(), "");
}

#[test]
fn unknown_command_is_an_outcome_not_an_error() {
    let out = eval("nonesuch a b");
    assert_eq!(out.status(), STATUS_NOT_FOUND);
    assert!(out.output().contains("nonesuch"));
}

#[test]
fn arguments_stay_unevaluated_until_a_command_asks() {
    // The alias body ignores its arguments, so the unknown command inside
    // the call's compound argument is never looked up.
    let out = eval("alias ignore [echo ok] ; ignore [nonesuch]");
    assert_eq!(out.output(), "ok");
    assert_eq!(out.status(), STATUS_OK);
}

#[test]
fn alias_binds_user_arguments() {
    let out = eval("alias greet [echo hello [arg 0]] ; greet world");
    assert_eq!(out.output(), "hello world");

    let out = eval("alias count [+arg] ; count a b c");
    assert_eq!(out.output(), "3");
}

#[test]
fn user_arguments_do_not_leak_outside_the_call() {
    let out = eval("alias inner [arg 0] ; inner x ; arg 0");
    assert_eq!(out.status(), 1);
}

#[test]
fn runaway_alias_hits_the_depth_guard() {
    let out = eval("alias loop [loop] ; loop");
    assert_eq!(out.status(), STATUS_FAULT);
    assert!(out.output().contains("depth limit"));
}

#[test]
fn mutual_alias_recursion_also_faults() {
    let out = eval("alias ping [pong] ; alias pong [ping] ; ping");
    assert_eq!(out.status(), STATUS_FAULT);
}

#[test]
fn locals_do_not_survive_the_commands_that_bind_them() {
    let out = eval("repeat 2 [echo [get i]] ; get i");
    assert_eq!(out.output(), "01");
    assert_eq!(out.status(), 1);

    let out = eval("local x 5 [echo [get x]] ; get x");
    assert_eq!(out.output(), "5");
    assert_eq!(out.status(), 1);
}

#[test]
fn reevaluating_one_tree_observes_host_changes() {
    let context = context();
    let expr = parse("get flag ? echo on : echo off").unwrap();

    assert_eq!(expr.evaluate(&context).output(), "off");
    assert!(parse("set flag 1").unwrap().evaluate(&context).truth_value());
    assert_eq!(expr.evaluate(&context).output(), "on");
}

#[test]
fn custom_depth_limit_applies_to_plain_nesting() {
    let context = context().with_depth_limit(4);
    let out = parse("echo [echo [echo [echo [echo deep]]]]")
        .unwrap()
        .evaluate(&context);
    assert!(out.output().contains("depth limit"));
}
