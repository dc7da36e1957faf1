// src/wgpu_utils/uniform_buffer.rs
//! Uniform buffer holding one `Content` block per draw, addressed with dynamic offsets

use std::marker::PhantomData;

/// Rounds `size` up to the next multiple of `alignment`
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// Growable array of uniform blocks bound through one bind group.
///
/// Draw `i` binds the group with offset [`offset(i)`](Self::offset). The
/// buffer and its bind group are recreated when a frame needs more slots.
pub struct DynamicUniformBuffer<Content> {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    layout: wgpu::BindGroupLayout,
    stride: u64,
    capacity: usize,
    content_type: PhantomData<Content>,
}

impl<Content: bytemuck::Pod> DynamicUniformBuffer<Content> {
    fn name() -> &'static str {
        let type_name = std::any::type_name::<Content>();
        match type_name.rfind(':') {
            Some(pos) => &type_name[(pos + 1)..],
            None => type_name,
        }
    }

    /// Layout with a single dynamic-offset uniform at binding 0
    pub fn create_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} Layout", Self::name())),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Content>() as u64),
                },
                count: None,
            }],
        })
    }

    /// # Arguments
    /// * `device` - device the buffer lives on
    /// * `layout` - layout from [`create_layout`](Self::create_layout)
    /// * `capacity` - initial number of slots
    pub fn new(device: &wgpu::Device, layout: wgpu::BindGroupLayout, capacity: usize) -> Self {
        let stride = aligned_stride(
            std::mem::size_of::<Content>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let capacity = capacity.max(1);
        let (buffer, bind_group) = Self::allocate(device, &layout, stride, capacity);
        Self {
            buffer,
            bind_group,
            layout,
            stride,
            capacity,
            content_type: PhantomData,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("DynamicUniformBuffer: {}", Self::name())),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Bind Group", Self::name())),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<Content>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Uploads `blocks` into slots `0..blocks.len()`, growing the buffer if needed
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, blocks: &[Content]) {
        if blocks.len() > self.capacity {
            let capacity = blocks.len().next_power_of_two();
            log::debug!(
                "growing {} buffer from {} to {} slots",
                Self::name(),
                self.capacity,
                capacity
            );
            let (buffer, bind_group) = Self::allocate(device, &self.layout, self.stride, capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = capacity;
        }

        let stride = self.stride as usize;
        let mut bytes = vec![0u8; stride * blocks.len()];
        for (slot, block) in bytes.chunks_exact_mut(stride).zip(blocks) {
            let src = bytemuck::bytes_of(block);
            slot[..src.len()].copy_from_slice(src);
        }
        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, &bytes);
        }
    }

    /// Dynamic offset of slot `index`
    pub fn offset(&self, index: usize) -> wgpu::DynamicOffset {
        (self.stride * index as u64) as wgpu::DynamicOffset
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
