//! Tests for the tortoise drawing context

use super::*;

fn installed() -> (Runtime, Arc<Tortoise<Vec<u8>>>) {
    let runtime = Runtime::default();
    let tortoise = Arc::new(Tortoise::new(Vec::new()));
    runtime.enter(|| tortoise.install(&runtime)).unwrap();
    (runtime, tortoise)
}

fn output_text(tortoise: &Tortoise<Vec<u8>>) -> String {
    String::from_utf8(tortoise.output().clone()).unwrap()
}

#[test]
fn test_starts_at_origin_with_pen_down() {
    let tortoise = Tortoise::new(Vec::new());
    assert_eq!(tortoise.state(), TortoiseState::default());
    assert!(tortoise.state().pen_down);
}

#[test]
fn test_pen_returns_previous_state() {
    let tortoise = Tortoise::new(Vec::new());
    assert!(tortoise.pen_up());
    assert!(!tortoise.pen_up());
    assert!(!tortoise.pen_down());
    assert!(tortoise.pen_down());
}

#[test]
fn test_turn_accumulates_degrees() {
    let tortoise = Tortoise::new(Vec::new());
    assert!((tortoise.turn(90.0) - 90.0).abs() < 1e-9);
    assert!((tortoise.turn(45.0) - 135.0).abs() < 1e-9);
}

#[test]
fn test_move_draws_only_with_pen_down() {
    let tortoise = Tortoise::new(Vec::new());
    let (x, y) = tortoise.advance(3.0).unwrap();
    assert_eq!((x, y), (3.0, 0.0));
    assert_eq!(
        output_text(&tortoise),
        "plot [0:1] 0.000000 + 3.000000 * t, 0.000000 + 0.000000 * t notitle\n"
    );

    tortoise.pen_up();
    tortoise.turn(90.0);
    let (x, y) = tortoise.advance(2.0).unwrap();
    assert!((x - 3.0).abs() < 1e-9);
    assert!((y - 2.0).abs() < 1e-9);
    assert_eq!(output_text(&tortoise).lines().count(), 1);
}

#[test]
fn test_reset_clears() {
    let tortoise = Tortoise::new(Vec::new());
    tortoise.turn(30.0);
    tortoise.advance(1.0).unwrap();
    tortoise.reset().unwrap();
    assert_eq!(tortoise.state(), TortoiseState::default());
    assert!(output_text(&tortoise).ends_with("clear\n"));
}

#[test]
fn test_preamble() {
    let tortoise = Tortoise::new(Vec::new());
    tortoise.preamble(10, 5).unwrap();
    let text = output_text(&tortoise);
    assert!(text.starts_with("set multiplot\n"));
    assert!(text.contains("set xrange [-10:10]\n"));
    assert!(text.contains("set yrange [-5:5]\n"));
}

#[test]
fn test_procedures_through_runtime() {
    let (runtime, tortoise) = installed();

    runtime.enter(|| {
        assert_eq!(runtime.call(PEN_UP, &[]).unwrap(), DynValue::from(true));
        assert_eq!(runtime.call(PEN_DOWN, &[]).unwrap(), DynValue::from(false));

        let heading = runtime.call_with(TURN, [90.0]).unwrap();
        assert!((heading.to::<f64>().unwrap() - 90.0).abs() < 1e-9);

        let position = runtime.call_with(MOVE, [4]).unwrap();
        let coords = position.to::<Vec<f64>>().unwrap();
        assert!(coords[0].abs() < 1e-9);
        assert!((coords[1] - 4.0).abs() < 1e-9);

        assert!(runtime.call(RESET, &[]).unwrap().is_unspecified());
    });

    assert_eq!(tortoise.state(), TortoiseState::default());
    assert!(output_text(&tortoise).ends_with("clear\n"));
}

#[test]
fn test_procedure_arities() {
    let (runtime, _tortoise) = installed();

    runtime.enter(|| {
        let turn = runtime.lookup(TURN).unwrap();
        assert_eq!(turn.to_string(), "#<procedure tortoise-turn (1 0 0)>");
        assert!(runtime.call(MOVE, &[]).unwrap_err().is_arity_mismatch());
        assert!(matches!(
            runtime.call_with(TURN, ["left"]),
            Err(BridgeError::WrongType { .. })
        ));
    });
}

#[test]
fn test_parse_command() {
    let (name, args) = parse_command("tortoise-move 10").unwrap();
    assert_eq!(name, MOVE);
    assert_eq!(args, vec![DynValue::from(10)]);

    let (_, args) = parse_command("  show 2.5 #t \"label\" north ; trailing").unwrap();
    assert_eq!(
        args,
        vec![
            DynValue::from(2.5),
            DynValue::from(true),
            DynValue::from("label"),
            DynValue::symbol("north"),
        ]
    );

    assert!(parse_command("").is_none());
    assert!(parse_command("   ; only a comment").is_none());
}

#[test]
fn test_parse_command_quoted_strings() {
    let (_, args) = parse_command(r#"label "a b" "x;y" 3 ; comment"#).unwrap();
    assert_eq!(
        args,
        vec![
            DynValue::from("a b"),
            DynValue::from("x;y"),
            DynValue::from(3),
        ]
    );

    let (_, args) = parse_command(r#"label "say \"hi\"" "back\\slash""#).unwrap();
    assert_eq!(
        args,
        vec![DynValue::from("say \"hi\""), DynValue::from("back\\slash")]
    );

    let (_, args) = parse_command(r#"label "open ended"#).unwrap();
    assert_eq!(args, vec![DynValue::from("open ended")]);
}
