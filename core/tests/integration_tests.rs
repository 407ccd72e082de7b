use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use cmdtree_core::{
    Command, Context, FlagSet, FlagValue, OptionConfig, RegistrationError, RunError, Shape, Slot,
    ValueError, current_command_usage, interceptor,
};

/// Shared event log for ordering assertions.
#[derive(Clone, Default)]
struct Trace(Rc<RefCell<Vec<String>>>);

impl Trace {
    fn push(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

/// Builds a one-option tree, runs it and returns the slot plus the result.
fn run_single<T: FlagValue>(
    short: Option<char>,
    long: Option<&str>,
    default: T,
    args: &[&str],
) -> (Slot<T>, cmdtree_core::RunResult) {
    let app = FlagSet::new("app", "");
    let slot = app.flag(short, long, default, "").unwrap();
    app.handle(|_ctx| {});
    let result = app.run(Context::new(), args);
    (slot, result)
}

// ---------------------------------------------------------------------------
// Dispatch and interceptors
// ---------------------------------------------------------------------------

#[test]
fn handler_runs_without_arguments() {
    let app = FlagSet::new("handle", "");
    let trace = Trace::default();
    let t = trace.clone();
    app.handle(move |_ctx| t.push("run"));

    let result = app.run(Context::new(), &[] as &[&str]);
    assert!(result.is_ok());
    assert_eq!(trace.events(), vec!["run"]);
}

#[test]
fn interceptors_wrap_in_registration_order() {
    let app = FlagSet::new("app", "");
    let trace = Trace::default();
    for name in ["i1", "i2"] {
        let t = trace.clone();
        app.intercept(move |ctx, next| {
            t.push(format!("{name} enter"));
            next(ctx);
            t.push(format!("{name} exit"));
        });
    }
    let t = trace.clone();
    app.handle(move |_ctx| t.push("handler"));

    assert!(app.run(Context::new(), &[] as &[&str]).is_ok());
    assert_eq!(
        trace.events(),
        vec!["i1 enter", "i2 enter", "handler", "i2 exit", "i1 exit"]
    );
}

#[test]
fn ancestor_interceptors_are_outermost() {
    let app = FlagSet::new("use", "");
    let trace = Trace::default();

    let t = trace.clone();
    app.intercept(move |ctx, next| {
        t.push("root-1");
        next(ctx)
    });
    let (t1, t2) = (trace.clone(), trace.clone());
    app.intercept(move |ctx, next| {
        t1.push("root-2");
        next(ctx)
    })
    .intercept(move |ctx, next| {
        t2.push("root-3");
        next(ctx)
    });

    let sub = app.command("sub", "").unwrap();
    let (t1, t2, t3) = (trace.clone(), trace.clone(), trace.clone());
    sub.intercept(move |ctx, next| {
        t1.push("sub-1");
        next(ctx)
    })
    .intercept(move |ctx, next| {
        t2.push("sub-2");
        next(ctx)
    })
    .handle(move |_ctx| t3.push("handler"));

    assert!(app.run(Context::new(), &["sub"]).is_ok());
    assert_eq!(
        trace.events(),
        vec!["root-1", "root-2", "root-3", "sub-1", "sub-2", "handler"]
    );
}

#[test]
fn handle_with_extra_interceptors_sit_inside_command_interceptors() {
    let app = FlagSet::new("app", "");
    let trace = Trace::default();
    let t = trace.clone();
    app.intercept(move |ctx, next| {
        t.push("node");
        next(ctx)
    });
    let (t1, t2, t3) = (trace.clone(), trace.clone(), trace.clone());
    app.handle_with(
        move |_ctx| t3.push("handler"),
        vec![
            interceptor(move |ctx, next| {
                t1.push("extra-1");
                next(ctx)
            }),
            interceptor(move |ctx, next| {
                t2.push("extra-2");
                next(ctx)
            }),
        ],
    );

    assert!(app.run(Context::new(), &[] as &[&str]).is_ok());
    assert_eq!(trace.events(), vec!["node", "extra-1", "extra-2", "handler"]);
}

#[test]
fn interceptor_can_short_circuit() {
    let app = FlagSet::new("app", "");
    let trace = Trace::default();
    let t = trace.clone();
    app.intercept(move |_ctx, _next| t.push("denied"));
    let t = trace.clone();
    app.command("sub", "")
        .unwrap()
        .handle(move |_ctx| t.push("handler"));

    assert!(app.run(Context::new(), &["sub"]).is_ok());
    assert_eq!(trace.events(), vec!["denied"]);
}

#[test]
fn interceptors_added_after_handle_are_not_applied() {
    let app = FlagSet::new("app", "");
    let trace = Trace::default();
    let t = trace.clone();
    app.handle(move |_ctx| t.push("handler"));
    let t = trace.clone();
    app.intercept(move |ctx, next| {
        t.push("late");
        next(ctx)
    });

    assert!(app.run(Context::new(), &[] as &[&str]).is_ok());
    assert_eq!(trace.events(), vec!["handler"]);
}

#[test]
fn context_names_owner_of_each_layer() {
    let app = FlagSet::new("app", "");
    let trace = Trace::default();
    let t = trace.clone();
    app.intercept(move |ctx, next| {
        t.push(ctx.command().map(Command::full_name).unwrap_or_default());
        next(ctx)
    });
    let sub = app.command("sub", "child").unwrap();
    let (t1, t2) = (trace.clone(), trace.clone());
    sub.intercept(move |ctx, next| {
        t1.push(ctx.command().map(Command::full_name).unwrap_or_default());
        next(ctx)
    })
    .handle(move |ctx| t2.push(current_command_usage(&ctx)));

    assert!(app.run(Context::new(), &["sub"]).is_ok());
    let events = trace.events();
    assert_eq!(events[0], "app");
    assert_eq!(events[1], "app sub");
    assert!(events[2].starts_with("app sub - child"));
}

#[test]
fn context_extensions_reach_the_handler() {
    let app = FlagSet::new("app", "");
    let trace = Trace::default();
    let t = trace.clone();
    app.handle(move |ctx| t.push(ctx.get::<&str>().copied().unwrap_or("missing")));

    let ctx = Context::new().with("request-42");
    assert!(app.run(ctx, &[] as &[&str]).is_ok());
    assert_eq!(trace.events(), vec!["request-42"]);
}

#[test]
fn statement_interceptors_only_wrap_its_commands() {
    let app = FlagSet::new("app", "");
    let trace = Trace::default();

    let t = trace.clone();
    app.command("before", "")
        .unwrap()
        .handle(move |_ctx| t.push("before"));

    let stmt = app.statement();
    let t = trace.clone();
    stmt.intercept(move |ctx, next| {
        t.push("guard");
        next(ctx)
    });
    let t = trace.clone();
    stmt.command("inside", "")
        .unwrap()
        .handle(move |_ctx| t.push("inside"));

    let t = trace.clone();
    app.command("after", "")
        .unwrap()
        .handle(move |_ctx| t.push("after"));

    let names: Vec<String> = app.subcommands().iter().map(Command::full_name).collect();
    assert_eq!(names, vec!["app before", "app inside", "app after"]);

    assert!(app.run(Context::new(), &["inside"]).is_ok());
    assert_eq!(trace.events(), vec!["guard", "inside"]);
}

#[test]
fn statement_interceptors_do_not_touch_earlier_commands() {
    let app = FlagSet::new("app", "");
    let trace = Trace::default();
    let t = trace.clone();
    app.command("before", "")
        .unwrap()
        .handle(move |_ctx| t.push("before"));
    let t = trace.clone();
    app.statement().intercept(move |ctx, next| {
        t.push("guard");
        next(ctx)
    });

    assert!(app.run(Context::new(), &["before"]).is_ok());
    assert_eq!(trace.events(), vec!["before"]);
}

#[test]
fn missing_handler_is_reported_with_usage() {
    let app = FlagSet::new("app", "root");
    app.command("sub", "child").unwrap();

    let result = app.run(Context::new(), &[] as &[&str]);
    assert!(matches!(
        result.error,
        Some(RunError::NoHandler { ref command }) if command == "app"
    ));
    assert!(result.usage.starts_with("app - root"));
}

// ---------------------------------------------------------------------------
// Help signal
// ---------------------------------------------------------------------------

#[test]
fn help_tokens_short_circuit_at_any_node() {
    for args in [
        vec!["-h"],
        vec!["--help"],
        vec!["help"],
        vec!["sub", "-h"],
        vec!["sub", "--help"],
        vec!["sub", "help"],
    ] {
        let app = FlagSet::new("app", "root");
        let trace = Trace::default();
        let t = trace.clone();
        let sub = app.command("sub", "child").unwrap();
        sub.handle(move |_ctx| t.push("ran"));

        let result = app.run(Context::new(), &args);
        assert!(result.is_help(), "{args:?}");
        assert!(trace.events().is_empty());
        let expected = if args[0] == "sub" { "app sub - child" } else { "app - root" };
        assert!(result.usage.starts_with(expected), "{args:?}");
    }
}

#[test]
fn help_stops_before_later_tokens_are_examined() {
    let (_slot, result) = run_single::<i32>(Some('n'), None, 0, &["-h", "-n", "oops", "--bogus"]);
    assert!(result.is_help());
}

#[test]
fn registered_h_option_takes_precedence_over_help() {
    let (host, result) = run_single::<String>(Some('h'), Some("host"), String::new(), &["-h", "db"]);
    assert!(result.is_ok());
    assert_eq!(host.get(), "db");
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

#[test]
fn integer_default_short_long_and_aligned() {
    let cases: [(&[&str], i64); 4] = [
        (&[], 789),
        (&["-i", "123"], 123),
        (&["--int", "456"], 456),
        (&["--int=-789"], -789),
    ];
    for (args, expected) in cases {
        let (value, result) = run_single::<i64>(Some('i'), Some("int"), 789, args);
        assert!(result.is_ok(), "{args:?}: {:?}", result.error);
        assert_eq!(value.get(), expected, "{args:?}");
    }
}

#[test]
fn narrow_integer_overflow_is_a_parse_error() {
    let (_, result) = run_single::<i8>(Some('n'), None, 0, &["-n", "200"]);
    let err = result.into_result().unwrap_err();
    assert_eq!(
        err.to_string(),
        "app: parse option -n: cannot set 200 to an i8, overflowed"
    );
    assert!(matches!(
        err,
        RunError::InvalidValue {
            source: ValueError::Overflow { .. },
            ..
        }
    ));
}

#[test]
fn missing_value_is_a_parse_error() {
    let (_, result) = run_single::<u32>(None, Some("count"), 0, &["--count"]);
    assert!(matches!(
        result.error,
        Some(RunError::InvalidValue {
            source: ValueError::NoInputValue,
            ..
        })
    ));
}

#[test]
fn floats_decode_at_declared_width() {
    let (value, result) = run_single::<f32>(Some('f'), None, 1.5, &["-f", "0.25"]);
    assert!(result.is_ok());
    assert_eq!(value.get(), 0.25);

    let (value, result) = run_single::<f64>(Some('f'), None, 1.5, &[]);
    assert!(result.is_ok());
    assert_eq!(value.get(), 1.5);
}

#[test]
fn out_of_range_floats_are_parse_errors() {
    let (value, result) = run_single::<f32>(Some('f'), None, 0.0, &["-f", "1e40"]);
    let err = result.into_result().unwrap_err();
    assert_eq!(
        err.to_string(),
        "app: parse option -f: cannot set 1e40 to an f32, overflowed"
    );
    assert_eq!(value.get(), 0.0);

    let (_, result) = run_single::<f64>(None, Some("ratio"), 0.0, &["--ratio=1e400"]);
    assert!(matches!(
        result.error,
        Some(RunError::InvalidValue {
            source: ValueError::Overflow { .. },
            ..
        })
    ));
}

#[test]
fn bool_presence_and_aligned_literals() {
    let (b, result) = run_single(Some('b'), Some("bool"), false, &[]);
    assert!(result.is_ok());
    assert!(!b.get());

    for args in [&["-b"][..], &["--bool"][..], &["--bool=true"][..]] {
        let (b, result) = run_single(Some('b'), Some("bool"), false, args);
        assert!(result.is_ok(), "{args:?}");
        assert!(b.get(), "{args:?}");
    }

    // A true default can only be turned off with an aligned literal.
    let (b, result) = run_single(Some('b'), Some("bool"), true, &["--bool=false"]);
    assert!(result.is_ok());
    assert!(!b.get());

    let (b, result) = run_single(Some('b'), Some("bool"), true, &[]);
    assert!(result.is_ok());
    assert!(b.get());
}

#[test]
fn bool_does_not_consume_following_literal() {
    let (b, result) = run_single(Some('b'), Some("bool"), false, &["-b", "false"]);
    assert!(b.get());
    assert!(matches!(
        result.error,
        Some(RunError::UnknownCommand { ref name, .. }) if name == "false"
    ));

    let (_, result) = run_single(Some('b'), Some("bool"), false, &["-b false"]);
    assert!(matches!(result.error, Some(RunError::UnknownOption { .. })));

    let (_, result) = run_single(Some('b'), Some("bool"), false, &["--bool=yes"]);
    assert_eq!(
        result.into_result().unwrap_err().to_string(),
        r#"app: parse option --bool=yes: invalid bool value: "yes""#
    );
}

#[test]
fn strings_take_the_next_token_verbatim() {
    let (s, result) = run_single(Some('s'), Some("str"), "dft".to_string(), &["-s", "--not-an-option"]);
    assert!(result.is_ok());
    assert_eq!(s.get(), "--not-an-option");
}

#[test]
fn duration_default_and_compound_values() {
    let cases: [(&[&str], Duration); 4] = [
        (&[], Duration::from_secs(1)),
        (&["-d", "2m"], Duration::from_secs(120)),
        (&["--dur", "3h4m5s"], Duration::from_secs(3 * 3600 + 4 * 60 + 5)),
        (&["--dur=750ms"], Duration::from_millis(750)),
    ];
    for (args, expected) in cases {
        let (d, result) = run_single(Some('d'), Some("dur"), Duration::from_secs(1), args);
        assert!(result.is_ok(), "{args:?}: {:?}", result.error);
        assert_eq!(d.get(), expected, "{args:?}");
    }
}

#[test]
fn datetime_uses_fixed_local_format() {
    let default = Local.with_ymd_and_hms(2020, 6, 1, 8, 0, 0).unwrap();
    let (t, result) = run_single::<DateTime<Local>>(Some('t'), Some("time"), default, &[]);
    assert!(result.is_ok());
    assert_eq!(t.get(), default);

    let (t, result) = run_single::<DateTime<Local>>(
        Some('t'),
        Some("time"),
        default,
        &["--time=2024-02-29T23:59:58"],
    );
    assert!(result.is_ok());
    assert_eq!(t.get(), Local.with_ymd_and_hms(2024, 2, 29, 23, 59, 58).unwrap());

    let (_, result) = run_single::<DateTime<Local>>(Some('t'), None, default, &["-t", "2024-02-29"]);
    assert!(matches!(
        result.error,
        Some(RunError::InvalidValue {
            source: ValueError::Timestamp { .. },
            ..
        })
    ));
}

#[test]
fn datetime_rejects_unpadded_fields() {
    let default = Local.with_ymd_and_hms(2020, 6, 1, 8, 0, 0).unwrap();
    let (t, result) =
        run_single::<DateTime<Local>>(Some('a'), None, default, &["-a", "2024-1-2T3:4:5"]);
    assert!(matches!(
        result.error,
        Some(RunError::InvalidValue {
            source: ValueError::Timestamp { .. },
            ..
        })
    ));
    assert_ne!(t.get(), Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
}

// ---------------------------------------------------------------------------
// Composites
// ---------------------------------------------------------------------------

#[test]
fn slice_default_repeat_and_aligned() {
    let default = vec![-1i64, -2, -3];
    let cases: [(&[&str], Vec<i64>); 3] = [
        (&[], vec![-1, -2, -3]),
        (&["-s", "4", "--slice", "-5", "-s", "6"], vec![4, -5, 6]),
        (&["--slice=-7,8,-9"], vec![-7, 8, -9]),
    ];
    for (args, expected) in cases {
        let (s, result) = run_single(Some('s'), Some("slice"), default.clone(), args);
        assert!(result.is_ok(), "{args:?}: {:?}", result.error);
        assert_eq!(s.get(), expected, "{args:?}");
    }
}

#[test]
fn slice_var_appends_to_caller_contents() {
    let app = FlagSet::new("app", "");
    let slot = Slot::new(vec!["keep".to_string()]);
    app.var(&slot, Some('s'), None, Vec::new(), "").unwrap();
    app.handle(|_ctx| {});
    assert!(app.run(Context::new(), &["-s", "x", "-s", "y"]).is_ok());
    assert_eq!(slot.get(), vec!["keep", "x", "y"]);
}

#[test]
fn slice_custom_separator() {
    let app = FlagSet::new("app", "");
    let tags = app
        .flag_with::<Vec<String>>(
            Some('t'),
            Some("tags"),
            Vec::new(),
            "",
            OptionConfig::new().with_separator("|"),
        )
        .unwrap();
    app.handle(|_ctx| {});
    assert!(app.run(Context::new(), &["--tags=a,b|c"]).is_ok());
    assert_eq!(tags.get(), vec!["a,b", "c"]);
}

#[test]
fn map_pairs_merge_across_occurrences() {
    let mut default = HashMap::new();
    default.insert("d".to_string(), 1u64);

    let (m, result) = run_single(
        Some('m'),
        Some("map"),
        default.clone(),
        &["--map", "a:7,b:8,c:9", "-m", "x:11,y:22,z:33"],
    );
    assert!(result.is_ok());
    let m = m.get();
    assert_eq!(m.len(), 6);
    for (key, value) in [("a", 7), ("b", 8), ("c", 9), ("x", 11), ("y", 22), ("z", 33)] {
        assert_eq!(m[key], value);
    }

    let (m, result) = run_single(
        Some('m'),
        Some("map"),
        default.clone(),
        &["--map=x:123,y:456", "--map=z:789"],
    );
    assert!(result.is_ok());
    let m = m.get();
    assert_eq!(m.len(), 3);
    assert_eq!(m["z"], 789);

    let (m, result) = run_single(Some('m'), Some("map"), default, &[]);
    assert!(result.is_ok());
    assert_eq!(m.get()["d"], 1);
}

#[test]
fn map_custom_separators() {
    let app = FlagSet::new("app", "");
    let env = app
        .flag_with::<BTreeMap<String, String>>(
            Some('e'),
            None,
            BTreeMap::new(),
            "",
            OptionConfig::new()
                .with_separator(";")
                .with_key_value_separator("="),
        )
        .unwrap();
    app.handle(|_ctx| {});
    assert!(app.run(Context::new(), &["-e", "A=1;B=x:y"]).is_ok());
    let env = env.get();
    assert_eq!(env["A"], "1");
    assert_eq!(env["B"], "x:y");
}

#[test]
fn map_malformed_pair_names_separator_and_count() {
    let (_, result) = run_single(
        Some('m'),
        None,
        HashMap::<String, u64>::new(),
        &["-m", "a:1,b:2:3"],
    );
    assert_eq!(
        result.into_result().unwrap_err().to_string(),
        r#"app: parse option -m: parse key/value: split "b:2:3" by ":": found 3 part(s)"#
    );
}

#[test]
fn slice_of_maps_keeps_each_occurrence_separate() {
    let (sm, result) = run_single(
        Some('s'),
        Some("slice-map"),
        Vec::<HashMap<String, Duration>>::new(),
        &["-s", "a:1s,b:2m", "--slice-map=c:3h"],
    );
    assert!(result.is_ok(), "{:?}", result.error);
    let sm = sm.get();
    assert_eq!(sm.len(), 2);
    assert_eq!(sm[0]["a"], Duration::from_secs(1));
    assert_eq!(sm[0]["b"], Duration::from_secs(120));
    assert_eq!(sm[1]["c"], Duration::from_secs(3 * 3600));
}

#[test]
fn map_of_slices_appends_repeated_keys() {
    let (ms, result) = run_single(
        Some('m'),
        None,
        HashMap::<u8, Vec<String>>::new(),
        &["-m", "11:x,11:y", "-m", "22:z,11:w"],
    );
    assert!(result.is_ok());
    let ms = ms.get();
    assert_eq!(ms[&11u8], vec!["x", "y", "w"]);
    assert_eq!(ms[&22u8], vec!["z"]);
}

// ---------------------------------------------------------------------------
// Clusters, positionals, aliases
// ---------------------------------------------------------------------------

#[test]
fn cluster_sets_bools_and_decodes_others_in_reverse() {
    let app = FlagSet::new("app", "");
    let a = app.flag::<bool>(Some('a'), None, false, "").unwrap();
    let x = app.flag::<String>(Some('x'), None, String::new(), "").unwrap();
    let y = app.flag::<String>(Some('y'), None, String::new(), "").unwrap();
    let b = app.flag::<bool>(Some('b'), None, false, "").unwrap();
    app.handle(|_ctx| {});

    let result = app.run(Context::new(), &["-axyb", "first", "second"]);
    assert!(result.is_ok(), "{:?}", result.error);
    assert!(a.get() && b.get());
    assert_eq!(y.get(), "first");
    assert_eq!(x.get(), "second");
}

#[test]
fn positionals_fill_in_order_then_reject() {
    let app = FlagSet::new("app", "");
    let src = app.positional::<String>(String::new(), "source").unwrap();
    let count = app.positional::<u32>(5, "count").unwrap();
    app.handle(|_ctx| {});
    assert!(app.run(Context::new(), &["in.txt"]).is_ok());
    assert_eq!(src.get(), "in.txt");
    assert_eq!(count.get(), 5);

    let app = FlagSet::new("app", "");
    app.positional::<String>(String::new(), "source").unwrap();
    app.handle(|_ctx| {});
    let result = app.run(Context::new(), &["one", "two"]);
    assert_eq!(
        result.into_result().unwrap_err().to_string(),
        "app: unknown sub command: two"
    );
}

#[test]
fn sub_command_beats_positional() {
    let app = FlagSet::new("app", "");
    let word = app.positional::<String>(String::new(), "").unwrap();
    let trace = Trace::default();
    let t = trace.clone();
    app.command("run", "").unwrap().handle(move |_ctx| t.push("run"));
    app.handle(|_ctx| {});

    assert!(app.run(Context::new(), &["run"]).is_ok());
    assert_eq!(trace.events(), vec!["run"]);
    assert_eq!(word.get(), "");
}

#[test]
fn aliases_route_to_their_command() {
    let app = FlagSet::new("app", "");
    let trace = Trace::default();
    let t = trace.clone();
    let remove = app.command("remove", "").unwrap();
    remove.alias(["rm", "del"]).unwrap().handle(move |_ctx| t.push("remove"));

    assert!(app.run(Context::new(), &["del"]).is_ok());
    assert_eq!(trace.events(), vec!["remove"]);
}

#[test]
fn unknown_tokens_name_the_command() {
    let app = FlagSet::new("app", "");
    app.handle(|_ctx| {});
    let result = app.run(Context::new(), &["--nope"]);
    assert_eq!(
        result.into_result().unwrap_err().to_string(),
        "app: unknown option: --nope"
    );

    let app = FlagSet::new("app", "");
    app.handle(|_ctx| {});
    let result = app.run(Context::new(), &["nope"]);
    assert!(matches!(
        result.error,
        Some(RunError::UnknownCommand { ref command, ref name }) if command == "app" && name == "nope"
    ));
}

// ---------------------------------------------------------------------------
// Defaults, inheritance, parsed
// ---------------------------------------------------------------------------

#[test]
fn child_inherits_options_registered_before_it() {
    let app = FlagSet::new("app", "");
    let sibling = app.command("early", "").unwrap();
    let c = app.flag::<i32>(Some('c'), None, 1, "").unwrap();
    let child = app.command("late", "").unwrap();
    sibling.handle(|_ctx| {});
    child.handle(|_ctx| {});

    let early_usage = sibling.usage();
    assert!(!early_usage.contains("-c"));
    assert!(child.usage().contains("  -c i32 (default: 1)"));

    let result = app.run(Context::new(), &["late", "-c", "9"]);
    assert!(result.is_ok());
    assert_eq!(c.get(), 9);
}

#[test]
fn sibling_created_before_option_rejects_it() {
    let app = FlagSet::new("app", "");
    let early = app.command("early", "").unwrap();
    app.flag::<i32>(Some('c'), None, 1, "").unwrap();
    early.handle(|_ctx| {});

    let result = app.run(Context::new(), &["early", "-c", "9"]);
    assert_eq!(
        result.into_result().unwrap_err().to_string(),
        "early: unknown option: -c"
    );
}

#[test]
fn parent_option_before_sub_command_survives_defaults() {
    let app = FlagSet::new("app", "");
    let level = app.flag::<u8>(Some('l'), None, 2, "").unwrap();
    app.command("sub", "").unwrap().handle(|_ctx| {});
    assert!(app.run(Context::new(), &["-l", "7", "sub"]).is_ok());
    assert_eq!(level.get(), 7);
}

#[test]
fn zero_default_is_opt_in() {
    let app = FlagSet::new("app", "");
    let plain = Slot::new(5i32);
    let zeroed = Slot::new(5i32);
    app.var(&plain, Some('p'), None, 0, "").unwrap();
    app.var_with(&zeroed, Some('z'), None, 0, "", OptionConfig::new().with_zero_default(true))
        .unwrap();
    app.handle(|_ctx| {});

    let usage = app.usage();
    assert!(usage.contains("  -p i32\n"));
    assert!(usage.contains("  -z i32 (default: 0)"));

    assert!(app.run(Context::new(), &[] as &[&str]).is_ok());
    assert_eq!(plain.get(), 5);
    assert_eq!(zeroed.get(), 0);
}

#[test]
fn parsed_reports_supplied_options() {
    let app = FlagSet::new("app", "");
    let name = app.flag::<String>(Some('n'), None, "x".into(), "").unwrap();
    let port = app.flag::<u16>(Some('p'), None, 80, "").unwrap();
    let root = app.root().clone();
    app.handle(|_ctx| {});

    assert!(app.run(Context::new(), &["-n", "y"]).is_ok());
    assert!(root.parsed(&name));
    assert!(!root.parsed(&port));
    assert_eq!(port.get(), 80);
}

#[test]
fn parsed_finds_options_registered_on_sub_commands() {
    let app = FlagSet::new("app", "");
    let serve = app.command("serve", "").unwrap();
    let port = serve.flag::<u16>(Some('p'), None, 80, "").unwrap();
    let host = serve.flag::<String>(None, Some("host"), String::new(), "").unwrap();
    serve.handle(|_ctx| {});
    let root = app.root().clone();
    let unbound = Slot::new(0u8);

    assert!(app.run(Context::new(), &["serve", "-p", "8080"]).is_ok());
    assert!(root.parsed(&port));
    assert!(!root.parsed(&host));
    assert!(!root.parsed(&unbound));
}

// ---------------------------------------------------------------------------
// Registration errors
// ---------------------------------------------------------------------------

#[test]
fn duplicate_names_and_slots_are_rejected_in_any_order() {
    let app = FlagSet::new("app", "");
    let slot = Slot::new(0i32);
    app.var(&slot, Some('a'), Some("alpha"), 0, "").unwrap();

    assert_eq!(
        app.flag::<i32>(Some('a'), Some("other"), 0, "").unwrap_err(),
        RegistrationError::DuplicateShort('a')
    );
    assert_eq!(
        app.flag::<i32>(Some('o'), Some("alpha"), 0, "").unwrap_err(),
        RegistrationError::DuplicateLong("alpha".into())
    );
    assert!(matches!(
        app.var(&slot, Some('z'), Some("zulu"), 0, ""),
        Err(RegistrationError::DuplicateSlot { .. })
    ));
    assert!(matches!(
        app.positional_var(&slot, 0, ""),
        Err(RegistrationError::DuplicateSlot { .. })
    ));

    // Uniqueness is per tree.
    let other = FlagSet::new("other", "");
    other.var(&slot, Some('a'), None, 0, "").unwrap();
}

// ---------------------------------------------------------------------------
// Custom value types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Level {
    Quiet,
    Normal,
    Loud,
}

impl FlagValue for Level {
    fn shape() -> Shape {
        Shape::Custom("level".into())
    }

    fn zero() -> Self {
        Level::Quiet
    }

    fn is_zero(&self) -> bool {
        *self == Level::Quiet
    }

    fn parse_flag(&mut self, text: &str) -> Result<(), ValueError> {
        *self = match text {
            "quiet" => Level::Quiet,
            "normal" => Level::Normal,
            "loud" => Level::Loud,
            other => return Err(ValueError::Custom(format!("unknown level {other:?}"))),
        };
        Ok(())
    }

    fn flag_type_of(&self) -> Option<String> {
        Some("quiet|normal|loud".into())
    }

    fn flag_string(&self) -> String {
        format!("{self:?}").to_lowercase()
    }
}

#[test]
fn custom_types_parse_and_render() {
    let app = FlagSet::new("app", "");
    let level = app.flag(Some('l'), Some("level"), Level::Normal, "verbosity").unwrap();
    let levels = app.flag::<Vec<Level>>(None, Some("each"), Vec::new(), "").unwrap();
    app.handle(|_ctx| {});

    let usage = app.usage();
    assert!(usage.contains("  -l, --level quiet|normal|loud (default: normal)"));
    assert!(usage.contains("  --each list<level>"));

    let result = app.run(Context::new(), &["--each=loud,quiet", "-l", "loud"]);
    assert!(result.is_ok(), "{:?}", result.error);
    assert_eq!(level.get(), Level::Loud);
    assert_eq!(levels.get(), vec![Level::Loud, Level::Quiet]);
}

#[test]
fn custom_parse_errors_are_wrapped() {
    let (_, result) = run_single(Some('l'), None, Level::Normal, &["-l", "shouty"]);
    assert_eq!(
        result.into_result().unwrap_err().to_string(),
        r#"app: parse option -l: unknown level "shouty""#
    );
}
