pub unsafe trait Byteable : bytemuck::Pod + bytemuck::Zeroable {}
unsafe impl<T> Byteable for T where T : bytemuck::Pod + bytemuck::Zeroable {}
