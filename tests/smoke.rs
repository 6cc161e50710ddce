use voxelgen_testkit::{chunk_digest, EventRecord, JsonlSink};
use voxelgen_world::{ChunkPos, ChunkStorage, TerrainGenerator, WorldgenSettings};

#[test]
fn generation_event_stream_can_be_written() {
    let generator = TerrainGenerator::new(WorldgenSettings::with_seed(1)).expect("generator");
    let pos = ChunkPos::new(0, 0);
    let mut world = ChunkStorage::new(1, generator.bounds());
    world.ensure_chunk(pos);
    generator.generate_chunk(&mut world, pos).expect("chunk generates");

    let digest = chunk_digest(world.get(pos).expect("resident").blocks());
    let mut sink = JsonlSink::create(std::env::temp_dir().join("voxelgen-eventlog.jsonl"))
        .expect("can create temp log");
    let record = EventRecord {
        seed: generator.seed(),
        chunk: [pos.x, pos.z],
        kind: "ChunkGenerated",
        payload: &digest,
    };
    sink.write(&record).expect("can write event");
}
