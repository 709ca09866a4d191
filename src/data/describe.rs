use super::model::Table;

const DESCRIPTIONS: [(&str, &str); 18] = [
    ("artist", "Name of the artist."),
    ("song", "Name of the track."),
    ("duration_ms", "Duration of the track in milliseconds."),
    ("explicit", "Whether the lyrics are offensive or unsuitable for children."),
    ("year", "Release year of the track."),
    ("popularity", "Popularity of the track (higher value = more popular)."),
    ("danceability", "How suitable a track is for dancing (0.0 to 1.0)."),
    ("energy", "A measure of intensity and activity (0.0 to 1.0)."),
    ("key", "The key the track is in, mapped using pitch class notation."),
    ("loudness", "The overall loudness of a track in decibels (dB)."),
    ("mode", "Modality of a track: major (1) or minor (0)."),
    ("speechiness", "Presence of spoken words in a track."),
    ("acousticness", "Confidence that the track is acoustic (0.0 to 1.0)."),
    ("instrumentalness", "Whether a track contains no vocals (closer to 1.0 = instrumental)."),
    ("liveness", "Presence of an audience in the recording."),
    ("valence", "Musical positiveness of a track (0.0 to 1.0)."),
    ("tempo", "Estimated tempo of a track in beats per minute (BPM)."),
    ("genre", "Genres of the track."),
];

/// What each column of the source dataset means. Needs no loaded dataset.
pub fn column_descriptions() -> Table {
    Table::from_pairs(
        "Attribute",
        "Description",
        DESCRIPTIONS
            .iter()
            .map(|(name, text)| (name.to_string(), *text)),
    )
}
