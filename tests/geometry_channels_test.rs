use obj_viewer::data_structures::geometry::{
    Channel, DEFAULT_COLOR, DEFAULT_TANGENT, GeometryPart, RawGeometry, generate_tangents,
};

fn triangle() -> RawGeometry {
    RawGeometry {
        name: "triangle".to_string(),
        material: None,
        position: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        indices: vec![0, 1, 2],
        ..Default::default()
    }
}

fn assert_close(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-5, "{actual:?} vs {expected:?}");
    }
}

#[test]
fn should_use_per_vertex_color_when_lengths_match() {
    let raw = RawGeometry {
        color: vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        ..triangle()
    };
    let part = GeometryPart::from_raw(raw);

    assert_eq!(part.color.components(), 3);
    assert_eq!(part.color.len(), Some(3));
    let vertices = part.vertices();
    assert_eq!(vertices[1].color, [0.0, 1.0, 0.0, 1.0]);
}

#[test]
fn should_fall_back_to_white_when_color_length_differs() {
    let raw = RawGeometry {
        color: vec![1.0, 0.0, 0.0],
        ..triangle()
    };
    let part = GeometryPart::from_raw(raw);

    assert_eq!(part.color, Channel::Constant(DEFAULT_COLOR.to_vec()));
    assert!(part.vertices().iter().all(|v| v.color == [1.0, 1.0, 1.0, 1.0]));
}

#[test]
fn should_fall_back_to_white_without_colors() {
    let part = GeometryPart::from_raw(triangle());
    assert!(part.color.is_constant());
    assert_eq!(part.color.components(), 4);
}

#[test]
fn should_generate_tangents_with_texcoords_and_normals() {
    let raw = RawGeometry {
        texcoord: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        normal: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        ..triangle()
    };
    let part = GeometryPart::from_raw(raw);

    assert_eq!(part.tangent.len(), Some(part.vertex_count()));
    let Channel::PerVertex { components, data } = &part.tangent else {
        panic!("expected generated tangents, got {:?}", part.tangent);
    };
    assert_eq!(*components, 3);
    assert_close(data, &[1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
}

#[test]
fn should_use_constant_tangent_without_normals() {
    let raw = RawGeometry {
        texcoord: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        ..triangle()
    };
    let part = GeometryPart::from_raw(raw);

    assert_eq!(part.tangent, Channel::Constant(DEFAULT_TANGENT.to_vec()));
    assert_eq!(part.normal, Channel::Constant(vec![0.0, 0.0, 1.0]));
}

#[test]
fn should_default_missing_texcoords_and_normals() {
    let part = GeometryPart::from_raw(triangle());

    assert_eq!(part.texcoord, Channel::Constant(vec![0.0, 0.0]));
    for vertex in part.vertices() {
        assert_eq!(vertex.tex_coords, [0.0, 0.0]);
        assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertex.tangent, [1.0, 0.0, 0.0]);
    }
}

#[test]
fn should_keep_default_tangent_for_degenerate_uvs() {
    let tangents = generate_tangents(
        &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        &[0.5, 0.5, 0.5, 0.5, 0.5, 0.5],
        &[0, 1, 2],
    );
    assert_close(&tangents, &[1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
}

#[test]
fn should_read_unindexed_positions_as_triangle_list() {
    let tangents = generate_tangents(
        &[0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        &[0.0, 0.0, 0.0, 1.0, 1.0, 0.0],
        &[],
    );
    // u runs along +z, v along +y
    assert_close(&tangents, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn should_average_tangents_of_shared_vertices() {
    // two triangles of a quad sharing the diagonal
    let position = [
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        1.0, 1.0, 0.0, //
        0.0, 1.0, 0.0,
    ];
    let texcoord = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
    let tangents = generate_tangents(&position, &texcoord, &[0, 1, 2, 0, 2, 3]);

    assert_eq!(tangents.len(), position.len());
    for tangent in tangents.chunks_exact(3) {
        assert_close(tangent, &[1.0, 0.0, 0.0]);
    }
}
