//! Lifecycle middlewares
//!
//! Each function here builds one pipeline [`Step`] over a
//! [`NavigationContext`]. [`navigate_steps`] and [`resolve_steps`] compose
//! them into the two runs the router performs:
//!
//! ```text
//! navigate: check_deprecations -> check_force_op -> match_registered_routes
//!           -> process_matches -> update_browser_url
//! resolve:  set_location_path -> match_registered_routes -> process_matches
//! ```
//!
//! `process_matches` branches on the match list. With matches, every match
//! runs `already` check, `before` hooks, handler and `after` hooks in its own
//! group, then the previous routes' `leave` hooks run and the matches are
//! committed. Without matches, the `leave` hooks run, a warning is logged
//! and the current matches are cleared.

use crate::context::{NavigationContext, Phase};
use crate::lifecycle::Done;
use crate::path::clean;
use crate::pipeline::Step;
use crate::{debug_log, trace_log, warn_log, Match};
use std::rc::Rc;

type NavStep = Step<NavigationContext>;

/// Steps of a `navigate` run
pub fn navigate_steps() -> Vec<NavStep> {
    vec![
        check_deprecations(),
        check_force_op(),
        match_registered_routes(),
        process_matches(),
        update_browser_url(),
    ]
}

/// Steps of a `resolve` run
pub fn resolve_steps() -> Vec<NavStep> {
    vec![
        set_location_path(),
        match_registered_routes(),
        process_matches(),
    ]
}

/// Translate the deprecated `silent`/`should_resolve` options.
pub fn check_deprecations() -> NavStep {
    Step::run("check_deprecations", |ctx: &mut NavigationContext, next| {
        let options = &mut ctx.navigate_options;
        if let Some(should_resolve) = options.should_resolve {
            warn_log!("\"shouldResolve\" is deprecated. Use callHandler/callHooks instead.");
            if !should_resolve {
                options.call_handler = false;
                options.call_hooks = false;
            }
        }
        if let Some(silent) = options.silent {
            warn_log!("\"silent\" is deprecated. Use callHandler/callHooks instead.");
            if silent {
                options.call_handler = false;
                options.call_hooks = false;
            }
        }
        next.proceed();
    })
}

/// End the run as a no-op when the target already is the current location
/// and `force` is not set. The current matches' `already` hooks fire.
pub fn check_force_op() -> NavStep {
    Step::run("check_force_op", |ctx: &mut NavigationContext, next| {
        if ctx.navigate_options.force {
            return next.proceed();
        }

        let Some(current) = ctx.previous.clone() else {
            return next.proceed();
        };
        let Some(first) = current.first() else {
            return next.proceed();
        };

        let (url, query) = ctx.target_url_and_query();
        if first.url != url || first.query_string != query {
            return next.proceed();
        }

        debug_log!("'{}' is already the current location", url);
        ctx.phase = Phase::NoOp;
        if ctx.navigate_options.call_hooks {
            for m in &current {
                for hook in m.route.hooks().already_hooks() {
                    hook(m);
                }
            }
        }
        next.skip();
    })
}

/// Read the location from the platform when no target was given.
pub fn set_location_path() -> NavStep {
    Step::run("set_location_path", |ctx: &mut NavigationContext, next| {
        if ctx.to.is_none() {
            let url = ctx
                .router
                .platform()
                .current_url()
                .unwrap_or_else(|| ctx.router.root_prefix());
            trace_log!("resolving platform location '{}'", url);
            ctx.to = Some(url);
        }
        ctx.locate();
        next.proceed();
    })
}

/// Match the location against the route table, falling back to the
/// not-found route.
pub fn match_registered_routes() -> NavStep {
    Step::run("match_registered_routes", |ctx: &mut NavigationContext, next| {
        ctx.phase = Phase::Matching;
        ctx.matches = ctx.router.match_with_fallback(
            &ctx.current_location_path,
            ctx.target(),
            ctx.resolve_options.strategy,
        );
        next.proceed();
    })
}

/// Branch on the match list.
pub fn process_matches() -> NavStep {
    Step::branch(
        |ctx: &NavigationContext| !ctx.matches.is_empty(),
        vec![
            Step::expand(|ctx: &NavigationContext| {
                (0..ctx.matches.len())
                    .map(|index| Step::group(found_lifecycle(index)))
                    .collect()
            }),
            leave_hooks(),
            commit(),
        ],
        vec![leave_hooks(), no_match()],
    )
}

/// Lifecycle of one match: already check, before hooks, handler, after hooks
pub fn found_lifecycle(index: usize) -> Vec<NavStep> {
    vec![
        check_already(index),
        before_hooks(index),
        call_handler(index),
        after_hooks(index),
    ]
}

/// Skip the rest of a match's lifecycle when it equals the current match.
pub fn check_already(index: usize) -> NavStep {
    Step::run("check_already", move |ctx: &mut NavigationContext, next| {
        if ctx.navigate_options.force {
            return next.proceed();
        }

        let m = &ctx.matches[index];
        let current = ctx.previous.as_deref().unwrap_or_default();
        let already = current.first().is_some_and(|c| c.same_location(m));
        if !already {
            return next.proceed();
        }

        trace_log!("route '{}' already active", m.route.name());
        if ctx.navigate_options.call_hooks {
            for c in current {
                for hook in c.route.hooks().already_hooks() {
                    hook(m);
                }
            }
        }
        next.skip();
    })
}

/// One step per `before` hook of the match; each may veto.
pub fn before_hooks(index: usize) -> NavStep {
    Step::expand(move |ctx: &NavigationContext| {
        if !ctx.navigate_options.call_hooks {
            return Vec::new();
        }
        ctx.matches[index]
            .route
            .hooks()
            .before_hooks()
            .into_iter()
            .map(|hook| {
                Step::run("before_hook", move |ctx: &mut NavigationContext, next| {
                    ctx.phase = Phase::BeforeHooks;
                    hook(Done::new(next), &ctx.matches[index]);
                })
            })
            .collect()
    })
}

/// Invoke the route handler.
pub fn call_handler(index: usize) -> NavStep {
    Step::run("call_handler", move |ctx: &mut NavigationContext, next| {
        if ctx.navigate_options.call_handler {
            ctx.phase = Phase::Handler;
            let m = &ctx.matches[index];
            debug_log!("Calling handler of '{}' for '{}'", m.route.name(), m.url);
            m.route.handler().call(m);
        }
        next.proceed();
    })
}

/// Notify the match's `after` hooks.
pub fn after_hooks(index: usize) -> NavStep {
    Step::run("after_hooks", move |ctx: &mut NavigationContext, next| {
        if ctx.navigate_options.call_hooks {
            ctx.phase = Phase::AfterHooks;
            let m = &ctx.matches[index];
            for hook in m.route.hooks().after_hooks() {
                hook(m);
            }
        }
        next.proceed();
    })
}

/// `leave` hooks of every previous match whose route is not matched again.
/// Each receives the new matches and may veto.
pub fn leave_hooks() -> NavStep {
    Step::expand(|ctx: &NavigationContext| {
        if !ctx.navigate_options.call_hooks {
            return Vec::new();
        }
        let Some(previous) = ctx.previous.as_deref() else {
            return Vec::new();
        };

        previous
            .iter()
            .filter(|old| !ctx.matches.iter().any(|m| Rc::ptr_eq(&m.route, &old.route)))
            .flat_map(|old| old.route.hooks().leave_hooks())
            .map(|hook| {
                Step::run("leave_hook", move |ctx: &mut NavigationContext, next| {
                    ctx.phase = Phase::LeaveHooks;
                    hook(Done::new(next), ctx.matches.as_slice());
                })
            })
            .collect()
    })
}

/// Make the run's matches the router's current matches.
pub fn commit() -> NavStep {
    Step::run("commit", |ctx: &mut NavigationContext, next| {
        if ctx.navigate_options.update_state {
            ctx.phase = Phase::Committing;
            let urls: Vec<&str> = ctx.matches.iter().map(|m| m.url.as_str()).collect();
            debug_log!("Committing {:?}", urls);
            ctx.router.set_current(Some(ctx.matches.clone()));
            ctx.committed = true;
        }
        next.proceed();
    })
}

/// Nothing matched and there is no not-found route.
pub fn no_match() -> NavStep {
    Step::run("no_match", |ctx: &mut NavigationContext, next| {
        ctx.phase = Phase::NotFound;
        if !ctx.resolve_options.no_match_warning {
            warn_log!(
                "\"{}\" didn't match any of the registered routes.",
                ctx.current_location_path
            );
        }
        if ctx.navigate_options.update_state {
            ctx.router.set_current(None);
            ctx.committed = true;
        }
        next.proceed();
    })
}

/// Write the target to the platform history.
pub fn update_browser_url() -> NavStep {
    Step::run("update_browser_url", |ctx: &mut NavigationContext, next| {
        if ctx.navigate_options.update_browser_url {
            ctx.phase = Phase::UpdatingUrl;
            let path = clean(ctx.target());
            let url = if ctx.resolve_options.hash {
                format!("#/{}", path)
            } else {
                format!("/{}", path)
            };
            ctx.router.write_browser_url(&url, &ctx.navigate_options);
        }
        next.proceed();
    })
}

/// Matches of a finished run, as returned by `resolve`
pub(crate) fn resolved_matches(ctx: &NavigationContext) -> Option<Vec<Match>> {
    (!ctx.matches.is_empty()).then(|| ctx.matches.clone())
}
