use indexmap::IndexMap;
use roomplot::config::Config;
use roomplot::layout::{EntityFactory, Scene, SceneLayout};
use roomplot::model::proposition::decode_all;
use roomplot::render::{Shape, SvgCanvas, layer};
use roomplot::types::Length;
use roomplot::{NoIcons, SceneError, SceneSpec, render_scene};

fn spec(json: &str) -> SceneSpec {
    SceneSpec::from_json_str("<test>", json).expect("valid scene document")
}

fn layout(spec: &SceneSpec, config: &Config) -> Result<(SceneLayout, SvgCanvas, Scene), SceneError> {
    let empty = IndexMap::new();
    let factory = EntityFactory::new(config, &NoIcons, &empty, &empty);
    let mut scene = Scene::from_spec(spec, &factory);
    let props = decode_all(&spec.propositions)?;
    let mut canvas = SvgCanvas::new();
    let layout = scene.plot(&mut canvas, config, &props, &spec.constraints, &factory, false)?;
    Ok((layout, canvas, scene))
}

const KITCHEN: &str = r#"{
    "instruction": "Put the apple on the table and any cup in the fridge.",
    "rooms": [
        { "id": "bedroom_0", "receptacles": ["bed_0"] },
        { "id": "kitchen_0", "receptacles": ["table_0", "fridge_0"], "objects": ["apple_0", "cup_0", "cup_1"] }
    ],
    "propositions": [
        { "function_name": "is_on_top",
          "args": { "object_names": ["apple_0"], "receptacle_names": ["table_0"], "number": 1 } },
        { "function_name": "is_inside",
          "args": { "object_names": ["cup_0", "cup_1"], "receptacle_names": ["fridge_0"], "number": 1 } }
    ],
    "constraints": [
        { "type": "TerminalSatisfactionConstraint", "args": { "proposition_indices": [0, 1] } }
    ]
}"#;

#[test]
fn rooms_are_ordered_by_relevance() {
    let spec = spec(
        r#"{
            "instruction": "Move the cup from the couch to the fridge.",
            "rooms": [
                { "id": "bedroom_0", "receptacles": ["bed_0"] },
                { "id": "living_room_0", "receptacles": ["couch_0"] },
                { "id": "kitchen_0", "receptacles": ["fridge_0", "counter_0"] }
            ]
        }"#,
    );
    let config = Config::default();
    let empty = IndexMap::new();
    let factory = EntityFactory::new(&config, &NoIcons, &empty, &empty);
    let scene = Scene::from_spec(&spec, &factory);
    let order: Vec<&str> = scene.rooms().iter().map(|r| r.id()).collect();
    insta::assert_snapshot!(order.join(" "), @"living_room_0 kitchen_0 bedroom_0");
}

#[test]
fn arrows_follow_propositions() {
    let config = Config::default();
    let (layout, _, _) = layout(&spec(KITCHEN), &config).unwrap();
    let arrows = &layout.levels[0].arrows;
    let summary: Vec<String> = arrows
        .iter()
        .map(|a| format!("{} {}", if a.dashed { "dashed" } else { "solid" }, a.has_head))
        .collect();
    insta::assert_snapshot!(summary.join("\n"), @r"
    solid true
    dashed true
    dashed true
    ");

    assert_eq!(arrows[0].color, config.palette.arrow_colors[0]);
    assert_eq!(arrows[1].color, config.palette.arrow_colors[1]);
    assert_eq!(arrows[1].to, arrows[2].to);
}

#[test]
fn empty_room_uses_half_height() {
    let spec = spec(
        r#"{
            "rooms": [ { "id": "hallway_0", "receptacles": ["table_0"] } ],
            "constraints": [ { "type": "TerminalSatisfactionConstraint", "args": { "proposition_indices": [] } } ]
        }"#,
    );
    let config = Config::default();
    let (layout, _, _) = layout(&spec, &config).unwrap();
    let rc = &config.room;
    let expected = rc.half_height + rc.top_pad + rc.bottom_pad + rc.vertical_margin * 2.0;
    assert_eq!(layout.height_upper, Length::ZERO);
    assert_eq!(layout.height_lower, -expected);
}

#[test]
fn rendering_is_repeatable() {
    let config = Config::default();
    let spec = spec(KITCHEN);
    let first = render_scene(&spec, &config, &NoIcons, false).unwrap();
    let second = render_scene(&spec, &config, &NoIcons, false).unwrap();
    assert_eq!(first.svg, second.svg);
}

#[test]
fn missing_terminal_constraint_is_fatal() {
    let mut spec = spec(KITCHEN);
    spec.constraints.clear();
    let err = layout(&spec, &Config::default()).unwrap_err();
    assert!(matches!(err, SceneError::MissingTerminalConstraint));
}

#[test]
fn strict_mode_rejects_unknown_entities() {
    let spec = spec(
        r#"{
            "rooms": [ { "id": "kitchen_0", "receptacles": ["table_0"], "objects": ["apple_0"] } ],
            "propositions": [
                { "function_name": "is_on_top",
                  "args": { "object_names": ["pear_0"], "receptacle_names": ["table_0"] } }
            ],
            "constraints": [ { "type": "TerminalSatisfactionConstraint", "args": { "proposition_indices": [0] } } ]
        }"#,
    );
    let mut config = Config::default();
    let (lenient, _, _) = layout(&spec, &config).unwrap();
    assert!(lenient.levels[0].arrows.is_empty());

    config.scene.strict = true;
    let err = layout(&spec, &config).unwrap_err();
    assert!(matches!(err, SceneError::MissingEntity { kind: "object", .. }));
}

#[test]
fn temporal_levels_stack_downward() {
    let mut spec = spec(KITCHEN);
    spec.constraints.push(
        serde_json::from_str(r#"{ "type": "TemporalConstraint", "args": { "dag_edges": [[0, 1]] } }"#).unwrap(),
    );
    let config = Config::default();
    let (layout, canvas, _) = layout(&spec, &config).unwrap();

    assert_eq!(layout.levels.len(), 2);
    let (first, second) = (&layout.levels[0], &layout.levels[1]);
    assert!(!first.instruction.is_empty());
    assert!(second.instruction.is_empty());
    assert_eq!(second.rows.height_upper, first.rows.height_lower - config.scene.level_gap);
    assert_eq!(first.arrows.len(), 1);
    assert_eq!(second.arrows.len(), 2);
    assert_eq!(layout.height_lower, second.rows.height_lower - config.scene.level_gap);

    let dividers = canvas
        .elements()
        .iter()
        .filter(|el| el.layer == layer::CONTENT && matches!(el.shape, Shape::Line { .. }))
        .count();
    assert_eq!(dividers, 2);
}

#[test]
fn next_to_legend_widens_the_view() {
    let spec = spec(
        r#"{
            "rooms": [ { "id": "kitchen_0", "receptacles": ["table_0"], "objects": ["cup_0"] } ],
            "propositions": [
                { "function_name": "is_next_to",
                  "args": {
                    "entity_handles_a_names_and_types": [["cup_0", "object"]],
                    "entity_handles_b_names_and_types": [["table_0", "receptacle"]]
                  } }
            ],
            "constraints": [ { "type": "TerminalSatisfactionConstraint", "args": { "proposition_indices": [0] } } ]
        }"#,
    );
    let config = Config::default();
    let (layout, _, _) = layout(&spec, &config).unwrap();
    let level = &layout.levels[0];
    let panel = level.legend.expect("legend drawn");

    assert!(level.arrows.is_empty());
    assert_eq!(level.x_min, -config.scene.legend_gap);
    assert!(panel.min.x > layout.width);
    assert!(layout.view.max.x >= panel.max.x);
}

#[test]
fn instruction_line_count_is_reported() {
    let mut spec = spec(KITCHEN);
    spec.instruction = "word ".repeat(40);
    let config = Config::default();
    let out = render_scene(&spec, &config, &NoIcons, false).unwrap();
    assert!(out.instruction_lines > 1);

    let hidden = render_scene(&spec, &config, &NoIcons, true).unwrap();
    assert_eq!(hidden.instruction_lines, 1);
    assert!(hidden.height < out.height);
}

fn room_index(scene: &Scene, id: &str) -> usize {
    scene.rooms().iter().position(|r| r.id() == id).expect("room in scene")
}

#[test]
fn room_arrows_end_at_the_room_center() {
    let spec = spec(
        r#"{
            "rooms": [
                { "id": "kitchen_0", "receptacles": ["table_0"], "objects": ["apple_0"] },
                { "id": "bedroom_0", "receptacles": ["bed_0"] }
            ],
            "propositions": [
                { "function_name": "is_in_room",
                  "args": { "object_names": ["apple_0"], "room_names": ["bedroom_0"] } }
            ],
            "constraints": [ { "type": "TerminalSatisfactionConstraint", "args": { "proposition_indices": [0] } } ]
        }"#,
    );
    let config = Config::default();
    let (layout, _, scene) = layout(&spec, &config).unwrap();
    let level = &layout.levels[0];
    let bedroom = level.rows.rooms[room_index(&scene, "bedroom_0")].as_ref().unwrap();

    assert_eq!(level.arrows.len(), 1);
    assert_eq!(level.arrows[0].to, bedroom.center);
    assert!(scene.rooms()[room_index(&scene, "bedroom_0")].plot_placeholder);
}

#[test]
fn floor_objects_pull_their_room_into_the_first_row() {
    let spec = spec(
        r#"{
            "rooms": [
                { "id": "kitchen_0", "receptacles": ["table_0"], "objects": ["apple_0"] },
                { "id": "hallway_0", "receptacles": ["shelves_0"] },
                { "id": "bedroom_0", "receptacles": ["bed_0"], "objects": ["sock_0"] }
            ],
            "propositions": [
                { "function_name": "is_on_floor", "args": { "object_names": ["sock_0"] } }
            ],
            "constraints": [ { "type": "TerminalSatisfactionConstraint", "args": { "proposition_indices": [0] } } ]
        }"#,
    );
    let mut config = Config::default();
    config.scene.target_width = None;
    let (layout, _, scene) = layout(&spec, &config).unwrap();
    let rows = &layout.levels[0].rows;

    for room in scene.rooms() {
        assert_eq!(room.in_proposition, room.id() == "bedroom_0", "{}", room.id());
    }

    let bedroom = rows.rooms[room_index(&scene, "bedroom_0")].as_ref().unwrap();
    assert_eq!(bedroom.bounds.min.x, Length::ZERO);
    assert_eq!(bedroom.bounds.max.y, rows.height_upper);
    assert_eq!(rows.width, bedroom.width);
    for id in ["kitchen_0", "hallway_0"] {
        let other = rows.rooms[room_index(&scene, id)].as_ref().unwrap();
        assert!(other.bounds.max.y <= bedroom.bounds.min.y, "{id} below the first row");
    }
}

#[test]
fn unconstrained_rows_wrap_to_the_first_row_width() {
    let spec = spec(
        r#"{
            "instruction": "Put the apple on the table.",
            "rooms": [
                { "id": "kitchen_0", "receptacles": ["table_0", "counter_0", "fridge_0", "sink_1"], "objects": ["apple_0"] },
                { "id": "bedroom_0", "receptacles": ["bed_0"] },
                { "id": "bedroom_1", "receptacles": ["bed_1"], "objects": ["book_0"] },
                { "id": "bathroom_0", "receptacles": ["sink_0"] },
                { "id": "hallway_0", "receptacles": ["shelves_0"] },
                { "id": "office_0", "receptacles": ["desk_0"], "objects": ["pen_0"] },
                { "id": "closet_0", "receptacles": ["rack_0"] },
                { "id": "garage_0", "receptacles": ["bench_0"] },
                { "id": "laundry_0", "receptacles": ["washer_0"] }
            ],
            "propositions": [
                { "function_name": "is_on_top",
                  "args": { "object_names": ["apple_0"], "receptacle_names": ["table_0"] } }
            ],
            "constraints": [ { "type": "TerminalSatisfactionConstraint", "args": { "proposition_indices": [0] } } ]
        }"#,
    );
    let mut config = Config::default();
    config.scene.target_width = None;
    let (layout, _, _) = layout(&spec, &config).unwrap();
    let rows = &layout.levels[0].rows;
    let placed: Vec<_> = rows.rooms.iter().flatten().collect();
    assert_eq!(placed.len(), 9);

    // group rooms by the bottom edge of their row, top row first
    let mut bottoms: Vec<Length> = Vec::new();
    for room in &placed {
        if !bottoms.contains(&room.bounds.min.y) {
            bottoms.push(room.bounds.min.y);
        }
    }
    bottoms.sort_by(|a, b| b.partial_cmp(a).unwrap());
    assert!(bottoms.len() >= 3, "only {} rows", bottoms.len());

    let first_row: Length = placed.iter().filter(|r| r.bounds.min.y == bottoms[0]).map(|r| r.width).sum();
    assert_eq!(rows.width, first_row);

    let mut top = rows.height_upper;
    for bottom in &bottoms {
        let row: Vec<_> = placed.iter().filter(|r| r.bounds.min.y == *bottom).collect();
        let total: Length = row.iter().map(|r| r.width).sum();
        let tallest = row.iter().map(|r| r.height).fold(Length::ZERO, Length::max);
        assert!(total <= first_row, "row at {bottom:?} is {total:?} wide");
        assert_eq!(top - tallest, *bottom);
        top = *bottom;
    }
    assert_eq!(rows.height_lower, top);
}

#[test]
fn unreadable_colour_is_rejected_before_layout() {
    let mut config = Config::default();
    config.palette.receptacle_colors.insert("table".to_string(), "#aébcd".to_string());
    let err = render_scene(&spec(KITCHEN), &config, &NoIcons, false).unwrap_err();
    assert!(err.to_string().contains("#aébcd"), "{err}");
}
