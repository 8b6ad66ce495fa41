diesel::table! {
    meetings (id) {
        id -> Int4,
        start_time -> Timestamptz,
        end_time -> Timestamptz,
        topic -> Text,
        participants -> Array<Text>,
    }
}

/// Bootstrap DDL, safe to run on every start.
pub const CREATE_MEETINGS: &str = "
CREATE TABLE IF NOT EXISTS meetings (
    id SERIAL PRIMARY KEY,
    start_time TIMESTAMPTZ NOT NULL,
    end_time TIMESTAMPTZ NOT NULL,
    topic TEXT NOT NULL,
    participants TEXT[] NOT NULL,
    CHECK (end_time > start_time),
    CHECK (cardinality(participants) > 0)
);
CREATE INDEX IF NOT EXISTS meetings_start_time_idx ON meetings (start_time);
CREATE INDEX IF NOT EXISTS meetings_end_time_idx ON meetings (end_time);
";
