use crate::pipeline::{PipelineData, PipelineStep, PipelineContext, MetadataValue};
use crate::detection::{preprocessing, threshold, median, regions};
use crate::config::{GrayscaleMode, HolePredicate, ThresholdPolicy};
use anyhow::Result;
use image::DynamicImage;
use imageproc::morphology::{grayscale_close, grayscale_open, Mask};

/// Convert image to a 16-bit grayscale intensity image
pub struct GrayscaleStep {
    pub mode: GrayscaleMode,
}

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let gray = preprocessing::to_grayscale(&item.image, self.mode);
            result.push(item.with_image(DynamicImage::ImageLuma16(gray)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Invert polarity so dark holes become bright
pub struct InvertStep;

impl PipelineStep for InvertStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let inverted = preprocessing::invert(&item.image.to_luma16());
            result.push(item.with_image(DynamicImage::ImageLuma16(inverted)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Invert"
    }
}

/// Global threshold into a 0/255 mask
pub struct ThresholdStep {
    pub policy: ThresholdPolicy,
}

impl PipelineStep for ThresholdStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let gray = item.image.to_luma16();
            let level = threshold::level_for(&gray, self.policy);
            tracing::debug!("Threshold level {:.2} ({:?})", level, self.policy);

            let mask = threshold::binarize(&gray, level);
            result.push(
                item.with_image(DynamicImage::ImageLuma8(mask))
                    .with_metadata("threshold", MetadataValue::Float(level)),
            );
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Threshold"
    }
}

/// Binary opening with one disk, then closing with another
///
/// On a 0/255 mask the grayscale min/max operators are exactly binary
/// erosion and dilation. Pixels outside the image are ignored.
pub struct MorphologyStep {
    pub open_radius: u8,
    pub close_radius: u8,
}

impl PipelineStep for MorphologyStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let open_disk = Mask::disk(self.open_radius);
        let close_disk = Mask::disk(self.close_radius);

        let mut result = Vec::new();
        for item in data {
            let mask = item.image.to_luma8();
            let opened = grayscale_open(&mask, &open_disk);
            let closed = grayscale_close(&opened, &close_disk);
            result.push(item.with_image(DynamicImage::ImageLuma8(closed)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Morphological Filtering"
    }
}

/// Clipped-window median filter
pub struct MedianFilterStep {
    pub window_size: u32,
}

impl PipelineStep for MedianFilterStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let filtered = median::median_filter(&item.image.to_luma8(), self.window_size);
            result.push(item.with_image(DynamicImage::ImageLuma8(filtered)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Median Filter"
    }
}

/// Label connected regions - splits one mask into one item per region
pub struct ComponentLabelingStep;

impl PipelineStep for ComponentLabelingStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let mask = item.image.to_luma8();
            let found = regions::label_regions(&mask);
            tracing::debug!("Labeled {} regions", found.len());

            // Each region becomes its own PipelineData, imaged by its mask crop
            for region in found {
                let crop = image::imageops::crop_imm(
                    &mask,
                    region.min_x,
                    region.min_y,
                    region.width(),
                    region.height(),
                ).to_image();

                let mut region_data = PipelineData::from_region(DynamicImage::ImageLuma8(crop), region);
                region_data.metadata = item.metadata.clone();
                result.push(region_data);
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Component Labeling"
    }
}

/// Keep only regions that satisfy the hole predicate
pub struct HoleFilterStep {
    pub predicate: HolePredicate,
}

impl PipelineStep for HoleFilterStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let total = data.len();
        let mut result = Vec::new();

        for item in data {
            let Some(region) = &item.region else {
                return Err(anyhow::anyhow!("Hole filtering needs labeled regions; add a labeling step first"));
            };

            if self.predicate.is_hole(region) {
                let circularity = region.circularity();
                result.push(
                    item.with_metadata("is_hole", MetadataValue::Bool(true))
                        .with_metadata("circularity", MetadataValue::Float(circularity)),
                );
            }
        }

        tracing::debug!("{} of {} regions qualify as holes", result.len(), total);
        Ok(result)
    }

    fn name(&self) -> &str {
        "Hole Filtering"
    }
}
