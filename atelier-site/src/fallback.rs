//! Sample content shown when the backend has nothing to offer

use atelier_common::{Artist, Attachment};

/// Labels and values shown when an artist has no quick facts of their own
pub const DEFAULT_QUICK_FACTS: [(&str, &str); 4] = [
    ("Experience", "Professional Artist"),
    ("Status", "Available for Commissions"),
    ("Location", "Worldwide"),
    ("Response Time", "Within 24 hours"),
];

const ATTACHMENT_BASE_URL: &str = "https://dl.airtable.com/.attachments";

fn attachment(id: &str, file: &str, title: &str) -> Attachment {
    Attachment {
        id: id.to_string(),
        url: format!("{}/{}", ATTACHMENT_BASE_URL, file),
        filename: title.to_string(),
        size: None,
        mime_type: None,
    }
}

/// Carousel artworks
pub fn sample_artworks() -> Vec<Attachment> {
    vec![
        attachment("art1", "artwork1.jpg", "Abstract Composition"),
        attachment("art2", "artwork2.jpg", "Modern Sculpture"),
        attachment("art3", "artwork3.jpg", "Contemporary Art"),
        attachment("art4", "artwork4.jpg", "Digital Artwork"),
        attachment("art5", "artwork5.jpg", "Mixed Media"),
        attachment("art6", "artwork6.jpg", "Abstract Expressionism"),
    ]
}

struct SampleArtist {
    id: &'static str,
    name: &'static str,
    speciality: &'static str,
    bio: &'static str,
    handle: &'static str,
    tags: [&'static str; 3],
}

const SAMPLE_ARTISTS: [SampleArtist; 3] = [
    SampleArtist {
        id: "artist1",
        name: "Sarah Chen",
        speciality: "Contemporary Abstract",
        bio: "Pioneering contemporary artist known for bold color palettes and dynamic \
              compositions that challenge traditional boundaries.",
        handle: "sarahchen",
        tags: ["contemporary", "abstract", "colorful"],
    },
    SampleArtist {
        id: "artist2",
        name: "Marcus Rodriguez",
        speciality: "Digital Sculpture",
        bio: "Innovative digital sculptor creating immersive 3D experiences that bridge \
              the gap between physical and virtual art.",
        handle: "marcusrodriguez",
        tags: ["digital", "sculpture", "3D"],
    },
    SampleArtist {
        id: "artist3",
        name: "Elena Petrov",
        speciality: "Mixed Media",
        bio: "Experimental artist combining traditional techniques with modern technology \
              to create thought-provoking installations.",
        handle: "elenapetrov",
        tags: ["mixed-media", "experimental", "installation"],
    },
];

/// Featured sample artists, each owning two of [`sample_artworks`]
pub fn sample_artists() -> Vec<Artist> {
    let artworks = sample_artworks();

    SAMPLE_ARTISTS
        .iter()
        .zip(artworks.chunks(2))
        .enumerate()
        .map(|(i, (sample, works))| Artist {
            speciality: Some(sample.speciality.to_string()),
            bio: Some(sample.bio.to_string()),
            profile_images: Some(vec![attachment(
                &format!("profile{}", i + 1),
                &format!("profile{}.jpg", i + 1),
                sample.name,
            )]),
            artwork_images: Some(works.to_vec()),
            social_links: Some(format!("https://instagram.com/{}", sample.handle)),
            tags: Some(sample.tags.iter().map(|t| t.to_string()).collect()),
            featured: Some(true),
            theme_primary_color: Some("#17624A".to_string()),
            theme_background_color: Some("#0f2027".to_string()),
            theme_text_color: Some("#ffffff".to_string()),
            ..Artist::new(sample.id, sample.name)
        })
        .collect()
}
